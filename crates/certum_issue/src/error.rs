//! Issuance errors.

use crate::classifier::ErrorCategory;
use crate::machine::TransitionError;

/// A precondition that blocks submission before any ledger mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// No account connected
    #[error("connect a wallet before issuing")]
    WalletNotConnected,

    /// Wallet is on another network
    #[error("wallet is on chain {actual:?}, expected {expected}")]
    WrongNetwork {
        /// Required chain id
        expected: u64,
        /// Wallet chain id
        actual: Option<u64>,
    },

    /// Mandatory field left blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Recipient name longer than the limit
    #[error("recipient name is {length} characters, limit is {limit}")]
    NameTooLong {
        /// Characters entered
        length: usize,
        /// Allowed characters
        limit: usize,
    },

    /// Recipient address is not ledger syntax
    #[error("invalid recipient address: {0}")]
    InvalidAddress(String),

    /// Issue date is not a calendar date
    #[error("invalid issue date: {0}")]
    InvalidIssueDate(String),

    /// Expiration date is not a calendar date
    #[error("invalid expiration date: {0}")]
    InvalidExpirationDate(String),

    /// Expiration date on or before the issue date
    #[error("expiration date must be after the issue date")]
    ExpirationNotAfterIssue,

    /// Document upload still running
    #[error("wait for the document upload to finish")]
    UploadInProgress,

    /// NFT issuance without a registered organization
    #[error("organization is not registered")]
    OrganizationNotRegistered,

    /// NFT issuance without complete branding
    #[error("organization {0} is required for NFT certificates")]
    MissingBranding(&'static str),

    /// Caller lacks the issuer capability
    #[error("account does not hold the issuer role")]
    MissingIssuerRole,
}

impl PreconditionError {
    /// Category recorded on the failed state
    ///
    /// Form problems carry their own reason as an `Unknown` category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::WrongNetwork { .. } => ErrorCategory::WrongNetwork,
            Self::MissingIssuerRole => ErrorCategory::Unauthorized,
            Self::OrganizationNotRegistered => ErrorCategory::NotRegistered,
            other => ErrorCategory::Unknown(other.to_string()),
        }
    }
}

/// Submission could not run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Another submission is in flight
    #[error("an issuance is already in progress")]
    AlreadyIssuing,

    /// Machine rejected a step
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Document upload failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Nothing to upload
    #[error("document is empty")]
    Empty,

    /// An upload is already running for this draft
    #[error("a document upload is already in progress")]
    AlreadyUploading,

    /// Storage rejected the upload
    #[error("document upload failed: {0}")]
    Failed(ErrorCategory),
}

/// Organization registration failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Name left blank
    #[error("organization name is required")]
    MissingName,

    /// Logo file is empty
    #[error("organization logo is required")]
    MissingLogo,

    /// Colour is not `#RRGGBB`
    #[error("brand colour must be #RRGGBB, got {0}")]
    InvalidColor(String),

    /// Logo upload or ledger call failed
    #[error("registration failed: {0}")]
    Failed(ErrorCategory),
}
