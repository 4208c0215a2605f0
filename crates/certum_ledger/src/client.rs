//! Ledger reader and writer traits.

use crate::error::LedgerResult;
use crate::event::{IssuedEvent, MintedEvent};
use async_trait::async_trait;
use certum_core::{Address, BlockNumber, Certificate, CertificateId, ScanWindow, TxHash};
use serde::{Deserialize, Serialize};

/// On-chain organization profile used to brand NFT certificates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Display name
    pub name: String,
    /// Gateway URL of the uploaded logo
    pub logo_url: Option<String>,
    /// Brand colour, `#RRGGBB`
    pub brand_color: Option<String>,
    /// Registration completed on-chain
    pub registered: bool,
}

impl Organization {
    /// A registered organization with full branding
    #[must_use]
    pub fn registered(
        name: impl Into<String>,
        logo_url: impl Into<String>,
        brand_color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            logo_url: Some(logo_url.into()),
            brand_color: Some(brand_color.into()),
            registered: true,
        }
    }
}

/// Read-only access to the ledger, usable without a connected signer
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Network the read endpoint serves
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unreachable
    async fn chain_id(&self) -> LedgerResult<u64>;

    /// Current chain head
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unreachable
    async fn block_number(&self) -> LedgerResult<BlockNumber>;

    /// "Certificate issued" logs inside `window`
    ///
    /// # Errors
    ///
    /// Returns error if the log query fails
    async fn issued_events(&self, window: ScanWindow) -> LedgerResult<Vec<IssuedEvent>>;

    /// "Certificate minted" logs inside `window`
    ///
    /// # Errors
    ///
    /// Returns error if the log query fails
    async fn minted_events(&self, window: ScanWindow) -> LedgerResult<Vec<MintedEvent>>;

    /// Point lookup of one certificate record
    ///
    /// # Errors
    ///
    /// Returns error if the contract call fails
    async fn certificate(&self, id: &CertificateId, is_nft: bool)
    -> LedgerResult<Option<Certificate>>;

    /// Whether `address` holds the issuer capability on the standard contract
    ///
    /// # Errors
    ///
    /// Returns error if the contract call fails
    async fn has_issuer_role(&self, address: &Address) -> LedgerResult<bool>;

    /// Organization profile registered by `address`
    ///
    /// # Errors
    ///
    /// Returns error if the contract call fails
    async fn organization(&self, address: &Address) -> LedgerResult<Option<Organization>>;
}

/// Standard issuance request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Signer submitting the transaction
    pub issuer: Address,
    /// Recipient display name
    pub recipient_name: String,
    /// Recipient address
    pub recipient_address: Address,
    /// Kind of credential
    pub certificate_type: String,
    /// Issuing institution
    pub institution_name: String,
    /// Date of issue, `YYYY-MM-DD`
    pub issue_date: String,
    /// Optional expiry, `YYYY-MM-DD`
    pub expiration_date: Option<String>,
    /// Free-text details
    pub additional_details: Option<String>,
    /// Content hash of an uploaded document
    pub document_hash: Option<String>,
}

/// NFT mint request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    /// Signer submitting the transaction
    pub issuer: Address,
    /// Token recipient
    pub recipient_address: Address,
    /// Recipient display name
    pub recipient_name: String,
    /// Kind of credential
    pub certificate_type: String,
    /// Issuing institution
    pub institution_name: String,
    /// Date of issue, `YYYY-MM-DD`
    pub issue_date: String,
    /// Optional expiry, `YYYY-MM-DD`
    pub expiration_date: Option<String>,
    /// Gateway URL of the uploaded metadata document
    pub metadata_url: String,
}

/// Organization registration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Registering account
    pub owner: Address,
    /// Display name
    pub name: String,
    /// Gateway URL of the uploaded logo
    pub logo_url: String,
    /// Brand colour, `#RRGGBB`
    pub brand_color: String,
}

/// Outcome of a confirmed issuance transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Identifier returned by the contract; `None` when the receipt carried none
    pub certificate_id: Option<CertificateId>,
    /// Submitted transaction
    pub transaction_hash: TxHash,
}

/// Signing access to the ledger
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Issue a standard certificate and await its identifier
    ///
    /// # Errors
    ///
    /// Returns error if the wallet or contract rejects the transaction
    async fn issue_certificate(&self, request: IssueRequest) -> LedgerResult<Submission>;

    /// Mint an NFT certificate and await its token identifier
    ///
    /// # Errors
    ///
    /// Returns error if the wallet or contract rejects the transaction
    async fn mint_certificate(&self, request: MintRequest) -> LedgerResult<Submission>;

    /// Register the caller's organization profile
    ///
    /// # Errors
    ///
    /// Returns error if the wallet or contract rejects the transaction
    async fn register_organization(&self, request: RegistrationRequest) -> LedgerResult<TxHash>;
}
