//! Filter state.

use certum_core::{Address, CoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contract-type filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractFilter {
    /// No narrowing
    #[default]
    All,
    /// Standard certificates only
    Standard,
    /// NFT-backed certificates only
    Nft,
}

impl ContractFilter {
    /// Whether a record of the given kind passes
    #[must_use]
    pub fn admits(self, is_nft: bool) -> bool {
        match self {
            Self::All => true,
            Self::Standard => !is_nft,
            Self::Nft => is_nft,
        }
    }
}

impl fmt::Display for ContractFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Standard => write!(f, "standard"),
            Self::Nft => write!(f, "nft"),
        }
    }
}

impl FromStr for ContractFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "standard" => Ok(Self::Standard),
            "nft" => Ok(Self::Nft),
            other => Err(CoreError::Validation {
                field: "contract_type".to_string(),
                reason: format!("expected all, standard or nft, got {}", other),
            }),
        }
    }
}

/// Everything the visible subset depends on besides the records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Contract-type stage
    pub contract_type: ContractFilter,
    /// "Mine only" toggle
    pub mine_only: bool,
    /// Connected wallet address, if known
    pub connected: Option<Address>,
    /// Free-text query as typed
    pub query: String,
}

impl FilterState {
    /// Create a state with every stage inactive
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the contract-type stage
    #[must_use]
    pub fn with_contract_type(mut self, contract_type: ContractFilter) -> Self {
        self.contract_type = contract_type;
        self
    }

    /// Restrict to records held by `connected`
    #[must_use]
    pub fn mine_only(mut self, connected: Option<Address>) -> Self {
        self.mine_only = true;
        self.connected = connected;
        self
    }

    /// Set the free-text query
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Ownership stage is active only with both the toggle and an address
    #[must_use]
    pub fn ownership_target(&self) -> Option<&Address> {
        if self.mine_only {
            self.connected.as_ref()
        } else {
            None
        }
    }

    /// Lowercased query, or `None` when blank
    #[must_use]
    pub fn normalized_query(&self) -> Option<String> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_filter_parse() {
        assert_eq!("NFT".parse::<ContractFilter>().unwrap(), ContractFilter::Nft);
        assert_eq!(" all ".parse::<ContractFilter>().unwrap(), ContractFilter::All);
        assert!("soulbound".parse::<ContractFilter>().is_err());
    }

    #[test]
    fn test_contract_filter_admits() {
        assert!(ContractFilter::All.admits(true));
        assert!(ContractFilter::Standard.admits(false));
        assert!(!ContractFilter::Standard.admits(true));
        assert!(!ContractFilter::Nft.admits(false));
    }

    #[test]
    fn test_ownership_needs_toggle_and_address() {
        let addr = Address::from_bytes([3; 20]);
        assert!(FilterState::new().ownership_target().is_none());
        assert!(FilterState::new().mine_only(None).ownership_target().is_none());
        let state = FilterState {
            connected: Some(addr),
            ..FilterState::default()
        };
        assert!(state.ownership_target().is_none());
        assert_eq!(FilterState::new().mine_only(Some(addr)).ownership_target(), Some(&addr));
    }

    #[test]
    fn test_blank_query_inactive() {
        assert!(FilterState::new().with_query("   ").normalized_query().is_none());
        assert_eq!(
            FilterState::new().with_query(" EnG ").normalized_query(),
            Some("eng".to_string())
        );
    }

    #[test]
    fn test_state_serde_shape() {
        let state = FilterState::new().with_contract_type(ContractFilter::Nft);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["contract_type"], "nft");
    }
}
