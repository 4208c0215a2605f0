//! Connected wallet session.

use certum_core::Address;
use serde::{Deserialize, Serialize};

/// State of the user's wallet connection, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    /// Connected account
    pub address: Option<Address>,
    /// Network the wallet is on
    pub chain_id: Option<u64>,
}

impl WalletSession {
    /// A connected wallet
    #[must_use]
    pub fn connected(address: Address, chain_id: u64) -> Self {
        Self {
            address: Some(address),
            chain_id: Some(chain_id),
        }
    }

    /// No wallet attached
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Whether an account is connected
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Whether the wallet is on the required network
    #[must_use]
    pub fn network_matches(&self, required_chain_id: u64) -> bool {
        self.chain_id == Some(required_chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_matches() {
        let session = WalletSession::connected(Address::from_bytes([1; 20]), 11155111);
        assert!(session.network_matches(11155111));
        assert!(!session.network_matches(1));
    }

    #[test]
    fn test_disconnected() {
        let session = WalletSession::disconnected();
        assert!(!session.is_connected());
        assert!(!session.network_matches(1));
    }
}
