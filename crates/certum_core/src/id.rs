//! Identifiers for CERTUM entities.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Ledger block height
pub type BlockNumber = u64;

/// Certificate identifier - assigned by the ledger, unique across the merged set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    /// Create from a ledger-assigned value
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse a ledger-assigned value, rejecting empty identifiers
    ///
    /// # Errors
    ///
    /// Returns error if the value is empty after trimming
    pub fn parse(value: &str) -> CoreResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidId {
                reason: "certificate id is empty".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier carries no value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CertificateId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}
