//! Issued certificates.

use crate::address::{Address, TxHash};
use crate::id::CertificateId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status reported by the ledger
///
/// Anything other than `active` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CertificateStatus {
    /// Valid certificate
    #[default]
    Active,
    /// Opaque status value
    Other(String),
}

impl CertificateStatus {
    /// Whether the status is `active`
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<String> for CertificateStatus {
    fn from(value: String) -> Self {
        if value == "active" {
            Self::Active
        } else {
            Self::Other(value)
        }
    }
}

impl From<CertificateStatus> for String {
    fn from(status: CertificateStatus) -> Self {
        match status {
            CertificateStatus::Active => "active".to_string(),
            CertificateStatus::Other(value) => value,
        }
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// One issued credential
///
/// Records are never mutated in place once cached: rediscovery replaces the
/// whole record keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Ledger-assigned identifier
    pub id: CertificateId,
    /// Recipient display name
    pub recipient_name: String,
    /// Recipient address
    pub recipient_address: Address,
    /// Kind of credential (degree, course, award...)
    pub certificate_type: String,
    /// Issuing institution
    pub institution_name: String,
    /// Date of issue
    pub issue_date: NaiveDate,
    /// Optional expiry, strictly after `issue_date` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    /// Free-text details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    /// Content hash of the uploaded supporting document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_hash: Option<String>,
    /// Gateway URL of the uploaded supporting document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    /// Produced by the NFT contract rather than the standard one
    #[serde(rename = "isNFT", default)]
    pub is_nft: bool,
    /// Lifecycle status
    #[serde(default)]
    pub status: CertificateStatus,
    /// Current token holder (NFT certificates only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    /// Transaction that issued or minted this certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
}

impl Certificate {
    /// Create a standard, active certificate with only the mandatory fields
    #[must_use]
    pub fn new(
        id: CertificateId,
        recipient_name: impl Into<String>,
        recipient_address: Address,
        certificate_type: impl Into<String>,
        institution_name: impl Into<String>,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            recipient_name: recipient_name.into(),
            recipient_address,
            certificate_type: certificate_type.into(),
            institution_name: institution_name.into(),
            issue_date,
            expiration_date: None,
            additional_details: None,
            document_hash: None,
            document_url: None,
            is_nft: false,
            status: CertificateStatus::Active,
            owner: None,
            transaction_hash: None,
        }
    }

    /// Set expiration date
    #[must_use]
    pub fn with_expiration(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    /// Set additional details
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.additional_details = Some(details.into());
        self
    }

    /// Attach an uploaded document
    #[must_use]
    pub fn with_document(mut self, hash: impl Into<String>, url: impl Into<String>) -> Self {
        self.document_hash = Some(hash.into());
        self.document_url = Some(url.into());
        self
    }

    /// Mark as NFT-backed, held by `owner`
    #[must_use]
    pub fn as_nft(mut self, owner: Option<Address>) -> Self {
        self.is_nft = true;
        self.owner = owner;
        self
    }

    /// Set status
    #[must_use]
    pub fn with_status(mut self, status: CertificateStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the issuing transaction
    #[must_use]
    pub fn with_transaction(mut self, hash: TxHash) -> Self {
        self.transaction_hash = Some(hash);
        self
    }

    /// Recipient is the sentinel address: burned or never issued
    #[must_use]
    pub fn is_burned(&self) -> bool {
        self.recipient_address.is_zero()
    }

    /// Whether the certificate has expired as of `today`
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|expiry| expiry < today)
    }

    /// Whether `address` is the recipient or the current holder
    #[must_use]
    pub fn is_held_by(&self, address: &Address) -> bool {
        self.recipient_address == *address || self.owner.as_ref() == Some(address)
    }
}
