//! Issuance form state.

use certum_core::{Address, Certificate, CertificateId, TxHash};
use certum_ledger::Organization;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw user input, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceForm {
    /// Recipient display name
    pub recipient_name: String,
    /// Recipient address
    pub recipient_address: String,
    /// Certificate type
    pub certificate_type: String,
    /// Issue date, `YYYY-MM-DD`
    pub issue_date: String,
    /// Expiration date, `YYYY-MM-DD`; blank means none
    #[serde(default)]
    pub expiration_date: String,
    /// Issuing institution
    pub institution_name: String,
    /// Free-text details
    #[serde(default)]
    pub additional_details: String,
    /// Issue through the NFT contract
    #[serde(default)]
    pub is_nft: bool,
}

/// Supporting document attached to the draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    /// Upload currently running
    pub uploading: bool,
    /// Content hash of the uploaded document
    pub hash: Option<String>,
    /// Gateway URL of the uploaded document
    pub url: Option<String>,
}

impl DocumentState {
    /// Mark an upload as started, clearing any earlier result
    pub fn begin_upload(&mut self) {
        self.uploading = true;
        self.hash = None;
        self.url = None;
    }

    /// Record a finished upload
    pub fn finish_upload(&mut self, hash: String, url: String) {
        self.uploading = false;
        self.hash = Some(hash);
        self.url = Some(url);
    }

    /// Clear the uploading flag after a failure
    pub fn abort_upload(&mut self) {
        self.uploading = false;
    }
}

/// Form plus document, reset together after a successful issuance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceDraft {
    /// Form fields
    pub form: IssuanceForm,
    /// Attached document
    #[serde(default)]
    pub document: DocumentState,
}

impl IssuanceDraft {
    /// Draft for `form` with no document
    #[must_use]
    pub fn new(form: IssuanceForm) -> Self {
        Self {
            form,
            document: DocumentState::default(),
        }
    }

    /// Clear every field
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Registration state of the issuing account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerContext {
    /// Organization registered by the issuer, if any
    pub organization: Option<Organization>,
}

impl IssuerContext {
    /// Context for an issuer with `organization`
    #[must_use]
    pub fn with_organization(organization: Organization) -> Self {
        Self {
            organization: Some(organization),
        }
    }
}

/// A form that passed every precondition, in typed form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidIssuance {
    /// Trimmed recipient name
    pub recipient_name: String,
    /// Parsed recipient address
    pub recipient_address: Address,
    /// Trimmed certificate type
    pub certificate_type: String,
    /// Trimmed institution name
    pub institution_name: String,
    /// Issue date
    pub issue_date: NaiveDate,
    /// Expiration date
    pub expiration_date: Option<NaiveDate>,
    /// Details, if any were entered
    pub additional_details: Option<String>,
    /// Uploaded document hash
    pub document_hash: Option<String>,
    /// Uploaded document URL
    pub document_url: Option<String>,
    /// Issue through the NFT contract
    pub is_nft: bool,
    /// Organization branding, present for NFT issuance
    pub organization: Option<Organization>,
}

impl ValidIssuance {
    /// Record to add to the cached set once the ledger confirms `id`
    #[must_use]
    pub fn into_certificate(self, id: CertificateId, transaction_hash: TxHash) -> Certificate {
        let mut certificate = Certificate::new(
            id,
            self.recipient_name,
            self.recipient_address,
            self.certificate_type,
            self.institution_name,
            self.issue_date,
        )
        .with_transaction(transaction_hash);
        if let Some(expiry) = self.expiration_date {
            certificate = certificate.with_expiration(expiry);
        }
        if let Some(details) = self.additional_details {
            certificate = certificate.with_details(details);
        }
        certificate.document_hash = self.document_hash;
        certificate.document_url = self.document_url;
        if self.is_nft {
            certificate = certificate.as_nft(Some(self.recipient_address));
        }
        certificate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lifecycle() {
        let mut doc = DocumentState::default();
        doc.begin_upload();
        assert!(doc.uploading);
        doc.finish_upload("b3aa".to_string(), "https://g/b3aa".to_string());
        assert!(!doc.uploading);
        assert_eq!(doc.hash.as_deref(), Some("b3aa"));

        doc.begin_upload();
        assert!(doc.hash.is_none());
        doc.abort_upload();
        assert!(!doc.uploading);
    }

    #[test]
    fn test_draft_reset() {
        let mut draft = IssuanceDraft::new(IssuanceForm {
            recipient_name: "Ada".to_string(),
            ..IssuanceForm::default()
        });
        draft.document.begin_upload();
        draft.reset();
        assert_eq!(draft, IssuanceDraft::default());
    }

    #[test]
    fn test_into_certificate_nft_owner() {
        let recipient = Address::from_bytes([4; 20]);
        let valid = ValidIssuance {
            recipient_name: "Ada".to_string(),
            recipient_address: recipient,
            certificate_type: "Degree".to_string(),
            institution_name: "Uni".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            expiration_date: None,
            additional_details: Some("cum laude".to_string()),
            document_hash: None,
            document_url: None,
            is_nft: true,
            organization: None,
        };
        let cert = valid.into_certificate(CertificateId::new("5"), TxHash::from_bytes([1; 32]));
        assert!(cert.is_nft);
        assert_eq!(cert.owner, Some(recipient));
        assert_eq!(cert.additional_details.as_deref(), Some("cum laude"));
        assert!(cert.status.is_active());
    }
}
