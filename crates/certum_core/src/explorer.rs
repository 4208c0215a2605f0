//! Block-explorer links.

use crate::address::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// Deterministic block-explorer URL templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerLinks {
    /// Explorer root, without trailing slash
    pub base_url: String,
}

impl ExplorerLinks {
    /// Create from an explorer root URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Link to a transaction
    #[must_use]
    pub fn tx_url(&self, hash: &TxHash) -> String {
        format!("{}/tx/{}", self.base_url, hash)
    }

    /// Link to an address
    #[must_use]
    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.base_url, address)
    }
}

impl Default for ExplorerLinks {
    fn default() -> Self {
        Self::new("https://sepolia.etherscan.io")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_url_strips_trailing_slash() {
        let links = ExplorerLinks::new("https://explorer.example/");
        let hash = TxHash::from_bytes([0xab; 32]);
        assert_eq!(
            links.tx_url(&hash),
            format!("https://explorer.example/tx/0x{}", "ab".repeat(32))
        );
    }

    #[test]
    fn test_address_url() {
        let links = ExplorerLinks::new("https://explorer.example");
        let addr = Address::from_bytes([0x11; 20]);
        assert!(links.address_url(&addr).ends_with(&format!("/address/0x{}", "11".repeat(20))));
    }
}
