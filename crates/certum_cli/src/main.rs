//! CERTUM CLI
//!
//! Scan, browse, issue, and verify ledger-backed certificates.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod config;
mod render;

use certum_core::Address;
use certum_issue::{IssuanceDraft, IssuanceForm};
use certum_ledger::WalletSession;
use certum_query::{ContractFilter, FilterState};
use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use config::CliConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "certum")]
#[command(about = "CERTUM - Ledger-backed certificate registry", long_about = None)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ledger fixture path, overriding the config
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Mirror database path, overriding the config
    #[arg(long, global = true)]
    mirror: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the certificate set from ledger events
    Scan {
        /// Connected wallet address
        #[arg(short, long)]
        wallet: Option<Address>,
        /// Network the wallet is on
        #[arg(long)]
        chain_id: Option<u64>,
    },
    /// List cached certificates
    List {
        /// Contract filter: all, standard, nft
        #[arg(short = 't', long = "type", default_value_t = ContractFilter::All)]
        contract_type: ContractFilter,
        /// Only certificates held by this address
        #[arg(short, long)]
        mine: Option<Address>,
        /// Case-insensitive text search
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Issue a certificate
    Issue(IssueArgs),
    /// Verify a certificate id against the ledger
    Verify {
        /// Certificate id
        id: String,
    },
    /// Register the issuing organization
    RegisterOrg {
        /// Organization owner address
        #[arg(long)]
        owner: Address,
        /// Organization name
        #[arg(long)]
        name: String,
        /// Logo image file
        #[arg(long)]
        logo: PathBuf,
        /// Brand colour, `#RRGGBB`
        #[arg(long)]
        color: String,
    },
    /// Print the explorer link for a transaction
    Explorer {
        /// Transaction hash
        tx: String,
    },
}

#[derive(Args)]
struct IssueArgs {
    /// Issuer wallet address
    #[arg(long)]
    from: Address,
    /// Network the wallet is on; defaults to the required network
    #[arg(long)]
    chain_id: Option<u64>,
    /// Recipient display name
    #[arg(long)]
    recipient_name: String,
    /// Recipient address
    #[arg(long)]
    recipient_address: String,
    /// Certificate type
    #[arg(long = "type")]
    certificate_type: String,
    /// Issue date, YYYY-MM-DD
    #[arg(long)]
    issue_date: String,
    /// Expiration date, YYYY-MM-DD
    #[arg(long, default_value = "")]
    expiration_date: String,
    /// Issuing institution
    #[arg(long)]
    institution: String,
    /// Free-text details
    #[arg(long, default_value = "")]
    details: String,
    /// Issue through the NFT contract
    #[arg(long)]
    nft: bool,
    /// Supporting document to upload first
    #[arg(long)]
    document: Option<PathBuf>,
}

impl IssueArgs {
    fn draft(&self) -> IssuanceDraft {
        IssuanceDraft::new(IssuanceForm {
            recipient_name: self.recipient_name.clone(),
            recipient_address: self.recipient_address.clone(),
            certificate_type: self.certificate_type.clone(),
            issue_date: self.issue_date.clone(),
            expiration_date: self.expiration_date.clone(),
            institution_name: self.institution.clone(),
            additional_details: self.details.clone(),
            is_nft: self.nft,
        })
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("certum=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("certum=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).wrap_err_with(|| format!("cannot read {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = CliConfig::load_or_default(cli.config.as_deref())?;
    if let Some(path) = cli.ledger {
        config = config.with_ledger_path(path);
    }
    if let Some(path) = cli.mirror {
        config = config.with_mirror_path(path);
    }

    match cli.command {
        Commands::Scan { wallet, chain_id } => {
            let session = wallet.map(|address| {
                WalletSession::connected(address, chain_id.unwrap_or(config.required_chain_id))
            });
            commands::scan(&config, session).await
        }
        Commands::List {
            contract_type,
            mine,
            query,
        } => {
            let mut state = FilterState::new()
                .with_contract_type(contract_type)
                .with_query(query.unwrap_or_default());
            if mine.is_some() {
                state = state.mine_only(mine);
            }
            commands::list(&config, state).await
        }
        Commands::Issue(args) => {
            let wallet = WalletSession::connected(
                args.from,
                args.chain_id.unwrap_or(config.required_chain_id),
            );
            let document = args.document.as_deref().map(read_file).transpose()?;
            commands::issue(&config, wallet, args.draft(), document).await
        }
        Commands::Verify { id } => commands::verify(&config, &id).await,
        Commands::RegisterOrg {
            owner,
            name,
            logo,
            color,
        } => {
            let logo = read_file(&logo)?;
            commands::register_org(&config, owner, &name, logo, &color).await
        }
        Commands::Explorer { tx } => commands::explorer(&config, &tx),
    }
}
