//! Decentralized storage client.

use crate::error::LedgerResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fields folded into NFT metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataInput {
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
    /// Free-text details
    pub additional_details: Option<String>,
    /// Content hash of an already-uploaded document
    pub document_hash: Option<String>,
    /// Organization logo URL
    pub logo_url: Option<String>,
    /// Organization brand colour
    pub brand_color: Option<String>,
}

/// Content-addressed storage used for documents, logos, and metadata
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload raw bytes, returning the content hash
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails
    async fn upload_file(&self, bytes: Vec<u8>) -> LedgerResult<String>;

    /// Upload a JSON document, returning the content hash
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails
    async fn upload_json(&self, value: serde_json::Value) -> LedgerResult<String>;

    /// Public gateway URL for a content hash
    fn gateway_url(&self, hash: &str) -> String;

    /// Build the NFT metadata document
    fn generate_metadata(&self, input: &MetadataInput) -> serde_json::Value;
}
