//! In-memory content-addressed storage.

use async_trait::async_trait;
use certum_ledger::{LedgerError, LedgerResult, MetadataInput, StorageClient};
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Gateway root used for simulated content
pub const SIM_GATEWAY: &str = "https://gateway.sim/ipfs";

#[derive(Debug, Default)]
struct StorageState {
    objects: HashMap<String, Vec<u8>>,
    uploads: usize,
    fail_with: Option<String>,
}

/// Simulated decentralized storage; content hashes are BLAKE3 digests
#[derive(Debug, Default)]
pub struct SimStorage {
    state: RwLock<StorageState>,
}

impl SimStorage {
    /// Create empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload fail with `message`
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(StorageState {
                fail_with: Some(message.into()),
                ..StorageState::default()
            }),
        }
    }

    /// Number of successful uploads
    pub async fn upload_count(&self) -> usize {
        self.state.read().await.uploads
    }

    /// Fetch stored content by hash
    pub async fn get(&self, hash: &str) -> Option<Vec<u8>> {
        self.state.read().await.objects.get(hash).cloned()
    }

    async fn put(&self, bytes: Vec<u8>) -> LedgerResult<String> {
        let mut state = self.state.write().await;
        if let Some(message) = &state.fail_with {
            return Err(LedgerError::Storage {
                message: message.clone(),
            });
        }
        let hash = format!("b3{}", blake3::hash(&bytes).to_hex());
        state.objects.insert(hash.clone(), bytes);
        state.uploads += 1;
        Ok(hash)
    }
}

#[async_trait]
impl StorageClient for SimStorage {
    async fn upload_file(&self, bytes: Vec<u8>) -> LedgerResult<String> {
        self.put(bytes).await
    }

    async fn upload_json(&self, value: serde_json::Value) -> LedgerResult<String> {
        let bytes = serde_json::to_vec(&value).map_err(|err| LedgerError::Storage {
            message: err.to_string(),
        })?;
        self.put(bytes).await
    }

    fn gateway_url(&self, hash: &str) -> String {
        format!("{}/{}", SIM_GATEWAY, hash)
    }

    fn generate_metadata(&self, input: &MetadataInput) -> serde_json::Value {
        let mut attributes = vec![
            json!({ "trait_type": "Recipient", "value": input.recipient_name }),
            json!({ "trait_type": "Type", "value": input.certificate_type }),
            json!({ "trait_type": "Institution", "value": input.institution_name }),
            json!({ "trait_type": "Issue Date", "value": input.issue_date }),
        ];
        if let Some(expiry) = &input.expiration_date {
            attributes.push(json!({ "trait_type": "Expiration Date", "value": expiry }));
        }
        if let Some(color) = &input.brand_color {
            attributes.push(json!({ "trait_type": "Brand Color", "value": color }));
        }
        json!({
            "name": format!("{} - {}", input.certificate_type, input.recipient_name),
            "description": input.additional_details.clone().unwrap_or_default(),
            "image": input.logo_url,
            "document": input.document_hash.as_ref().map(|hash| self.gateway_url(hash)),
            "attributes": attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_is_content_addressed() {
        let storage = SimStorage::new();
        let a = storage.upload_file(b"diploma".to_vec()).await.unwrap();
        let b = storage.upload_file(b"diploma".to_vec()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(storage.get(&a).await, Some(b"diploma".to_vec()));
        assert_eq!(storage.upload_count().await, 2);
    }

    #[tokio::test]
    async fn test_failing_storage() {
        let storage = SimStorage::failing("gateway timeout");
        let err = storage.upload_json(json!({})).await.unwrap_err();
        assert!(matches!(err, LedgerError::Storage { .. }));
        assert_eq!(storage.upload_count().await, 0);
    }

    #[test]
    fn test_metadata_references_document_and_branding() {
        let storage = SimStorage::new();
        let input = MetadataInput {
            recipient_name: "Ada".to_string(),
            certificate_type: "Degree".to_string(),
            institution_name: "Uni".to_string(),
            issue_date: "2025-01-01".to_string(),
            document_hash: Some("b3abc".to_string()),
            brand_color: Some("#ff0000".to_string()),
            ..MetadataInput::default()
        };
        let metadata = storage.generate_metadata(&input);
        assert_eq!(metadata["document"], format!("{}/b3abc", SIM_GATEWAY));
        let attributes = metadata["attributes"].as_array().unwrap();
        assert!(attributes.iter().any(|a| a["value"] == "#ff0000"));
        assert!(attributes.iter().any(|a| a["value"] == "Uni"));
    }
}
