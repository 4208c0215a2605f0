//! Terminal rendering.

use certum_core::{Certificate, ExplorerLinks};
use certum_issue::{Notice, NoticeLevel};
use chrono::NaiveDate;
use console::style;

/// One summary line per certificate
#[must_use]
pub fn certificate_row(certificate: &Certificate, today: NaiveDate) -> String {
    let kind = if certificate.is_nft { "NFT" } else { "STD" };
    let status = if certificate.is_expired(today) {
        style("expired").red().to_string()
    } else if certificate.status.is_active() {
        style("active").green().to_string()
    } else {
        style(certificate.status.to_string()).yellow().to_string()
    };
    format!(
        "#{:<6} {} {:<24} {:<20} {:<24} {} {} {}",
        certificate.id,
        style(kind).bold(),
        certificate.recipient_name,
        certificate.certificate_type,
        certificate.institution_name,
        certificate.issue_date,
        certificate.recipient_address.short(),
        status
    )
}

/// Print a certificate list with explorer links
pub fn print_certificates(records: &[Certificate], explorer: &ExplorerLinks, today: NaiveDate) {
    if records.is_empty() {
        println!("{}", style("No certificates found").dim());
        return;
    }
    for certificate in records {
        println!("{}", certificate_row(certificate, today));
        if let Some(tx) = &certificate.transaction_hash {
            println!("        {}", style(explorer.tx_url(tx)).dim());
        }
    }
    println!("{} certificate(s)", records.len());
}

/// Full certificate record, one field per line
#[must_use]
pub fn certificate_detail(certificate: &Certificate, explorer: &ExplorerLinks) -> Vec<String> {
    let mut lines = vec![
        format!("{} #{}", style("Certificate").bold(), certificate.id),
        format!(
            "  recipient    {} ({})",
            certificate.recipient_name,
            certificate.recipient_address.short()
        ),
        format!("  type         {}", certificate.certificate_type),
        format!("  institution  {}", certificate.institution_name),
        format!("  issued       {}", certificate.issue_date),
    ];
    if let Some(expiry) = certificate.expiration_date {
        lines.push(format!("  expires      {}", expiry));
    }
    if let Some(details) = &certificate.additional_details {
        lines.push(format!("  details      {}", details));
    }
    if let Some(url) = &certificate.document_url {
        lines.push(format!("  document     {}", url));
    }
    if let Some(owner) = &certificate.owner {
        lines.push(format!("  holder       {}", owner.short()));
    }
    let contract = if certificate.is_nft { "nft" } else { "standard" };
    lines.push(format!("  contract     {}", contract));
    if let Some(tx) = &certificate.transaction_hash {
        lines.push(format!("  transaction  {}", explorer.tx_url(tx)));
    }
    lines
}

/// Print a full certificate record
pub fn print_certificate_detail(certificate: &Certificate, explorer: &ExplorerLinks) {
    for line in certificate_detail(certificate, explorer) {
        println!("{}", line);
    }
}

/// Styled notice line
#[must_use]
pub fn notice_line(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("{} {}", style("·").cyan(), notice.message),
        NoticeLevel::Success => format!("{} {}", style("✓").green(), notice.message),
        NoticeLevel::Error => format!("{} {}", style("✗").red(), notice.message),
    }
}
