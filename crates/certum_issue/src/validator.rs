//! Issuance preconditions.

use crate::error::PreconditionError;
use crate::form::{DocumentState, IssuanceForm, IssuerContext, ValidIssuance};
use certum_core::{Address, parse_calendar_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum recipient name length, in characters
pub const MAX_RECIPIENT_NAME: usize = 100;

/// Outcome of every precondition check, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Individual checks
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// Whether every check passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Failed checks
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&ValidationCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Look up a check by name
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        format!(
            "Preconditions {}: {}/{} checks passed",
            if self.passed() { "PASSED" } else { "FAILED" },
            passed,
            self.checks.len()
        )
    }
}

/// A single precondition check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Check name
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Failure reason, or "ok"
    pub message: String,
}

impl ValidationCheck {
    fn from_result(name: &str, result: &Result<(), PreconditionError>) -> Self {
        match result {
            Ok(()) => Self {
                name: name.to_string(),
                passed: true,
                message: "ok".to_string(),
            },
            Err(err) => Self {
                name: name.to_string(),
                passed: false,
                message: err.to_string(),
            },
        }
    }
}

/// Pure precondition validator
///
/// Does not cover the network identity or the issuer role; both need the
/// live wallet and ledger and are checked by the submitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreconditionValidator;

impl PreconditionValidator {
    /// Create a validator
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run every check and report each outcome
    #[must_use]
    pub fn validate(
        &self,
        form: &IssuanceForm,
        document: &DocumentState,
        issuer: &IssuerContext,
    ) -> ValidationReport {
        ValidationReport {
            checks: evaluate(form, document, issuer)
                .iter()
                .map(|(name, result)| ValidationCheck::from_result(name, result))
                .collect(),
        }
    }

    /// Whether the submit control should be enabled
    #[must_use]
    pub fn is_ready(
        &self,
        form: &IssuanceForm,
        document: &DocumentState,
        issuer: &IssuerContext,
    ) -> bool {
        evaluate(form, document, issuer)
            .iter()
            .all(|(_, result)| result.is_ok())
    }

    /// Typed issuance, or the first failing precondition
    ///
    /// # Errors
    ///
    /// Returns the first check that fails, in evaluation order
    pub fn check(
        &self,
        form: &IssuanceForm,
        document: &DocumentState,
        issuer: &IssuerContext,
    ) -> Result<ValidIssuance, PreconditionError> {
        for (_, result) in evaluate(form, document, issuer) {
            result?;
        }

        let recipient_address = Address::parse(form.recipient_address.trim())
            .map_err(|_| PreconditionError::InvalidAddress(form.recipient_address.clone()))?;
        let issue_date = parse_issue_date(form)?;
        let expiration_date = parse_expiration(form, issue_date)?;

        Ok(ValidIssuance {
            recipient_name: form.recipient_name.trim().to_string(),
            recipient_address,
            certificate_type: form.certificate_type.trim().to_string(),
            institution_name: form.institution_name.trim().to_string(),
            issue_date,
            expiration_date,
            additional_details: non_blank(&form.additional_details),
            document_hash: document.hash.clone(),
            document_url: document.url.clone(),
            is_nft: form.is_nft,
            organization: if form.is_nft {
                issuer.organization.clone()
            } else {
                None
            },
        })
    }
}

type CheckResult = Result<(), PreconditionError>;

fn evaluate(
    form: &IssuanceForm,
    document: &DocumentState,
    issuer: &IssuerContext,
) -> Vec<(&'static str, CheckResult)> {
    vec![
        ("required_fields", required_fields(form)),
        ("name_length", name_length(form)),
        ("address_syntax", address_syntax(form)),
        ("issue_date", parse_issue_date(form).map(|_| ())),
        ("expiration_date", expiration(form)),
        ("upload_idle", upload_idle(document)),
        ("nft_registration", nft_registration(form, issuer)),
        ("nft_branding", nft_branding(form, issuer)),
    ]
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required_fields(form: &IssuanceForm) -> CheckResult {
    let fields = [
        ("recipient name", &form.recipient_name),
        ("recipient address", &form.recipient_address),
        ("certificate type", &form.certificate_type),
        ("issue date", &form.issue_date),
        ("institution name", &form.institution_name),
    ];
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(PreconditionError::MissingField(*name)),
        None => Ok(()),
    }
}

fn name_length(form: &IssuanceForm) -> CheckResult {
    let length = form.recipient_name.trim().chars().count();
    if length > MAX_RECIPIENT_NAME {
        return Err(PreconditionError::NameTooLong {
            length,
            limit: MAX_RECIPIENT_NAME,
        });
    }
    Ok(())
}

fn address_syntax(form: &IssuanceForm) -> CheckResult {
    if Address::is_valid(form.recipient_address.trim()) {
        Ok(())
    } else {
        Err(PreconditionError::InvalidAddress(
            form.recipient_address.clone(),
        ))
    }
}

fn parse_issue_date(form: &IssuanceForm) -> Result<NaiveDate, PreconditionError> {
    parse_calendar_date(&form.issue_date)
        .map_err(|_| PreconditionError::InvalidIssueDate(form.issue_date.clone()))
}

fn parse_expiration(
    form: &IssuanceForm,
    issue_date: NaiveDate,
) -> Result<Option<NaiveDate>, PreconditionError> {
    if form.expiration_date.trim().is_empty() {
        return Ok(None);
    }
    let expiry = parse_calendar_date(&form.expiration_date)
        .map_err(|_| PreconditionError::InvalidExpirationDate(form.expiration_date.clone()))?;
    if expiry <= issue_date {
        return Err(PreconditionError::ExpirationNotAfterIssue);
    }
    Ok(Some(expiry))
}

fn expiration(form: &IssuanceForm) -> CheckResult {
    if form.expiration_date.trim().is_empty() {
        return Ok(());
    }
    match parse_issue_date(form) {
        Ok(issue_date) => parse_expiration(form, issue_date).map(|_| ()),
        // Without a valid issue date the ordering cannot hold
        Err(_) => {
            parse_calendar_date(&form.expiration_date).map_err(|_| {
                PreconditionError::InvalidExpirationDate(form.expiration_date.clone())
            })?;
            Err(PreconditionError::ExpirationNotAfterIssue)
        }
    }
}

fn upload_idle(document: &DocumentState) -> CheckResult {
    if document.uploading {
        Err(PreconditionError::UploadInProgress)
    } else {
        Ok(())
    }
}

fn nft_registration(form: &IssuanceForm, issuer: &IssuerContext) -> CheckResult {
    if !form.is_nft {
        return Ok(());
    }
    match &issuer.organization {
        Some(org) if org.registered => Ok(()),
        _ => Err(PreconditionError::OrganizationNotRegistered),
    }
}

fn nft_branding(form: &IssuanceForm, issuer: &IssuerContext) -> CheckResult {
    if !form.is_nft {
        return Ok(());
    }
    let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    let org = issuer.organization.as_ref();
    if !org.is_some_and(|o| present(&o.logo_url)) {
        return Err(PreconditionError::MissingBranding("logo"));
    }
    if !org.is_some_and(|o| present(&o.brand_color)) {
        return Err(PreconditionError::MissingBranding("brand colour"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use certum_ledger::Organization;

    fn form() -> IssuanceForm {
        IssuanceForm {
            recipient_name: "Ada Lovelace".to_string(),
            recipient_address: "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01".to_string(),
            certificate_type: "Engineering".to_string(),
            issue_date: "2025-01-01".to_string(),
            expiration_date: String::new(),
            institution_name: "Analytical Society".to_string(),
            additional_details: String::new(),
            is_nft: false,
        }
    }

    fn registered() -> IssuerContext {
        IssuerContext::with_organization(Organization::registered(
            "Analytical Society",
            "https://gateway.sim/ipfs/logo",
            "#112233",
        ))
    }

    fn check(form: &IssuanceForm, issuer: &IssuerContext) -> Result<ValidIssuance, PreconditionError> {
        PreconditionValidator::new().check(form, &DocumentState::default(), issuer)
    }

    #[test]
    fn test_valid_standard_form() {
        let valid = check(&form(), &IssuerContext::default()).unwrap();
        assert_eq!(valid.recipient_address.to_hex(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert!(valid.expiration_date.is_none());
        assert!(valid.organization.is_none());
    }

    #[test]
    fn test_missing_field() {
        let mut f = form();
        f.institution_name = "   ".to_string();
        assert_eq!(
            check(&f, &IssuerContext::default()),
            Err(PreconditionError::MissingField("institution name"))
        );
    }

    #[test]
    fn test_name_length_boundary() {
        let mut f = form();
        f.recipient_name = "é".repeat(100);
        assert!(check(&f, &IssuerContext::default()).is_ok());
        f.recipient_name = "é".repeat(101);
        assert!(matches!(
            check(&f, &IssuerContext::default()),
            Err(PreconditionError::NameTooLong { length: 101, .. })
        ));
    }

    #[test]
    fn test_bad_address() {
        let mut f = form();
        f.recipient_address = "0x123".to_string();
        assert!(matches!(
            check(&f, &IssuerContext::default()),
            Err(PreconditionError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_expiration_must_be_strictly_later() {
        let mut f = form();
        f.expiration_date = "2025-01-01".to_string();
        assert_eq!(
            check(&f, &IssuerContext::default()),
            Err(PreconditionError::ExpirationNotAfterIssue)
        );

        f.expiration_date = "2025-01-02".to_string();
        let valid = check(&f, &IssuerContext::default()).unwrap();
        assert_eq!(valid.expiration_date, NaiveDate::from_ymd_opt(2025, 1, 2));

        f.expiration_date = "2025-13-40".to_string();
        assert!(matches!(
            check(&f, &IssuerContext::default()),
            Err(PreconditionError::InvalidExpirationDate(_))
        ));
    }

    #[test]
    fn test_upload_in_progress_blocks() {
        let mut document = DocumentState::default();
        document.begin_upload();
        let validator = PreconditionValidator::new();
        assert!(!validator.is_ready(&form(), &document, &IssuerContext::default()));
        assert_eq!(
            validator.check(&form(), &document, &IssuerContext::default()),
            Err(PreconditionError::UploadInProgress)
        );
    }

    #[test]
    fn test_nft_requires_registration_and_branding() {
        let mut f = form();
        f.is_nft = true;
        assert_eq!(
            check(&f, &IssuerContext::default()),
            Err(PreconditionError::OrganizationNotRegistered)
        );

        let mut unbranded = registered();
        if let Some(org) = unbranded.organization.as_mut() {
            org.brand_color = Some(String::new());
        }
        assert_eq!(
            check(&f, &unbranded),
            Err(PreconditionError::MissingBranding("brand colour"))
        );

        let valid = check(&f, &registered()).unwrap();
        assert!(valid.is_nft);
        assert!(valid.organization.is_some());
    }

    #[test]
    fn test_report_lists_every_check() {
        let mut f = form();
        f.recipient_address = "nope".to_string();
        f.expiration_date = "2024-01-01".to_string();
        let report = PreconditionValidator::new().validate(&f, &DocumentState::default(), &IssuerContext::default());

        assert_eq!(report.checks.len(), 8);
        assert!(!report.passed());
        let failed: Vec<_> = report.failed_checks().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec!["address_syntax", "expiration_date"]);
        assert!(report.check("nft_branding").unwrap().passed);
        assert_eq!(report.summary(), "Preconditions FAILED: 6/8 checks passed");
    }

    #[test]
    fn test_check_agrees_with_is_ready() {
        let validator = PreconditionValidator::new();
        let doc = DocumentState::default();
        let ctx = IssuerContext::default();
        let mut f = form();
        assert_eq!(validator.is_ready(&f, &doc, &ctx), validator.check(&f, &doc, &ctx).is_ok());
        f.issue_date = "yesterday".to_string();
        assert!(!validator.is_ready(&f, &doc, &ctx));
        assert!(matches!(
            validator.check(&f, &doc, &ctx),
            Err(PreconditionError::InvalidIssueDate(_))
        ));
    }
}
