//! Subcommand implementations.

use crate::config::CliConfig;
use crate::render;
use certum_core::{Address, CertificateId, TxHash};
use certum_issue::{
    CertificateVerifier, DocumentUploader, IssuanceDraft, IssuanceSubmitter,
    OrganizationRegistrar, Verification,
};
use certum_ledger::WalletSession;
use certum_query::{FilterEngine, FilterState};
use certum_scan::LedgerEventScanner;
use certum_sim::{SimFixture, SimLedger, SimStorage};
use certum_store::{CertificateMirror, CertificateRepository, RedbMirror};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("cannot create {}", parent.display()))?;
    }
    Ok(())
}

fn open_mirror(config: &CliConfig) -> Result<RedbMirror> {
    ensure_parent(&config.mirror_path)?;
    Ok(RedbMirror::open(&config.mirror_path)?)
}

fn open_ledger(config: &CliConfig) -> Result<Arc<SimLedger>> {
    let fixture = if config.ledger_path.exists() {
        SimFixture::load(&config.ledger_path)
            .wrap_err_with(|| format!("cannot load ledger {}", config.ledger_path.display()))?
    } else {
        tracing::info!(path = %config.ledger_path.display(), "no ledger fixture; starting empty");
        SimFixture::new(config.required_chain_id)
    };
    let limit = config.provider_ceiling.saturating_sub(1).max(1);
    Ok(Arc::new(SimLedger::new(fixture).with_max_block_range(limit)))
}

async fn save_ledger(config: &CliConfig, ledger: &SimLedger) -> Result<()> {
    ensure_parent(&config.ledger_path)?;
    ledger.fixture().await.save(&config.ledger_path)?;
    Ok(())
}

async fn seeded_repository(mirror: &RedbMirror) -> Result<Arc<CertificateRepository>> {
    let repository = Arc::new(CertificateRepository::new());
    repository.seed_from(mirror).await?;
    Ok(repository)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Rebuild the certificate set from the ledger and persist it
pub async fn scan(config: &CliConfig, wallet: Option<WalletSession>) -> Result<()> {
    let mirror = open_mirror(config)?;
    let repository = seeded_repository(&mirror).await?;
    let ledger = open_ledger(config)?;
    let scanner = LedgerEventScanner::new(ledger).with_config(config.scan_config());

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg:>9} [{bar:40.cyan/blue}] {pos:>3}%")?
            .progress_chars("=> "),
    );

    let token = repository.begin_scan().await;
    let result = scanner
        .scan_with_progress(wallet.as_ref(), |progress| {
            bar.set_message(progress.stream.to_string());
            bar.set_position(u64::from(progress.percent()));
        })
        .await;
    bar.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            let cached = repository.len().await;
            bail!("{} (keeping {} cached certificate(s))", err, cached);
        }
    };

    let merged = report.merged();
    let count = merged.len();
    if repository.apply_scan(token, merged).await {
        repository.persist(&mirror).await?;
    }

    println!(
        "{} {} certificate(s) up to block {}",
        style("Scanned").green().bold(),
        count,
        report.head
    );
    if !report.is_complete() {
        println!(
            "{} {} window(s) and {} lookup(s) failed; results may be incomplete",
            style("warning:").yellow().bold(),
            report.failed_windows.len(),
            report.failed_lookups
        );
    }
    Ok(())
}

/// Print the cached set narrowed by `state`
pub async fn list(config: &CliConfig, state: FilterState) -> Result<()> {
    let mirror = open_mirror(config)?;
    let records = mirror.load()?;
    let visible = FilterEngine::new().apply(&records, &state);
    render::print_certificates(&visible, &config.explorer(), today());
    Ok(())
}

/// Issue one certificate from `draft`
pub async fn issue(
    config: &CliConfig,
    wallet: WalletSession,
    mut draft: IssuanceDraft,
    document: Option<Vec<u8>>,
) -> Result<()> {
    let mirror: Arc<dyn CertificateMirror> = Arc::new(open_mirror(config)?);
    let repository = Arc::new(CertificateRepository::new());
    repository.seed_from(mirror.as_ref()).await?;
    let ledger = open_ledger(config)?;
    let storage = Arc::new(SimStorage::new());

    if let Some(bytes) = document {
        let url = DocumentUploader::new(storage.clone())
            .upload(&mut draft.document, bytes)
            .await?;
        println!("{} document stored at {}", style("·").cyan(), url);
    }

    let submitter = IssuanceSubmitter::new(
        ledger.clone(),
        storage,
        repository,
        mirror,
        config.required_chain_id,
    );
    let outcome = submitter.submit(&mut draft, &wallet).await?;
    for notice in &outcome.notices {
        println!("{}", render::notice_line(notice));
    }

    match (&outcome.certificate, outcome.failure()) {
        (Some(certificate), _) => {
            save_ledger(config, &ledger).await?;
            render::print_certificate_detail(certificate, &config.explorer());
            Ok(())
        }
        (None, Some(category)) => bail!("issuance failed: {}", category),
        (None, None) => bail!("issuance ended in state {}", outcome.state),
    }
}

/// Look one certificate up on the ledger
pub async fn verify(config: &CliConfig, id: &str) -> Result<()> {
    let id = CertificateId::parse(id)?;
    let verifier = CertificateVerifier::new(open_ledger(config)?);
    match verifier.verify(&id).await? {
        Verification::Verified { certificate } => {
            println!("{}", style("Verified").green().bold());
            render::print_certificate_detail(&certificate, &config.explorer());
            if certificate.is_expired(today()) {
                println!("{}", style("This certificate has expired").yellow());
            }
        }
        Verification::NotFound => {
            println!("{} no certificate with id {}", style("Not found:").red().bold(), id);
        }
    }
    Ok(())
}

/// Register the issuing organization
pub async fn register_org(
    config: &CliConfig,
    owner: Address,
    name: &str,
    logo: Vec<u8>,
    brand_color: &str,
) -> Result<()> {
    let ledger = open_ledger(config)?;
    let registrar = OrganizationRegistrar::new(ledger.clone(), Arc::new(SimStorage::new()));
    let receipt = registrar
        .register_organization(owner, name, logo, brand_color)
        .await?;
    save_ledger(config, &ledger).await?;

    println!("{} {}", style("Registered").green().bold(), name.trim());
    println!("  logo         {}", receipt.logo_url);
    println!(
        "  transaction  {}",
        config.explorer().tx_url(&receipt.transaction_hash)
    );
    Ok(())
}

/// Print the explorer link for a transaction
pub fn explorer(config: &CliConfig, tx: &str) -> Result<()> {
    let hash = TxHash::parse(tx.trim())?;
    println!("{}", config.explorer().tx_url(&hash));
    Ok(())
}
