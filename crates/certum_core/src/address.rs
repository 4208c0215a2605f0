//! Ledger addresses and transaction hashes.
//!
//! Both are parsed from `0x`-prefixed hex, compared byte-wise (so comparison
//! is case-insensitive on input) and rendered in lowercase canonical form.

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address pattern compiles"));

static TX_HASH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("tx hash pattern compiles"));

/// A 20-byte ledger address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The number of bytes in an address
    pub const LEN: usize = 20;

    /// The all-zero sentinel address (burned or never-issued slot)
    pub const ZERO: Self = Self([0u8; 20]);

    /// Check whether a string matches the ledger's address syntax
    #[must_use]
    pub fn is_valid(input: &str) -> bool {
        ADDRESS_PATTERN.is_match(input)
    }

    /// Parse from `0x` + 40 hex digits, any letter case
    ///
    /// # Errors
    ///
    /// Returns error if the input does not match the address syntax
    pub fn parse(input: &str) -> CoreResult<Self> {
        if !Self::is_valid(input) {
            return Err(CoreError::InvalidAddress {
                input: input.to_string(),
            });
        }
        let bytes = hex::decode(&input[2..]).map_err(|_| CoreError::InvalidAddress {
            input: input.to_string(),
        })?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the sentinel address
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Canonical lowercase form, `0x`-prefixed
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Display form used wherever an address is shown: `0x1234...abcd`
    #[must_use]
    pub fn short(&self) -> String {
        let full = self.to_hex();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }

    /// Case-insensitive comparison against raw user input
    #[must_use]
    pub fn matches_str(&self, other: &str) -> bool {
        Self::parse(other.trim()).is_ok_and(|parsed| parsed == *self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_hex()
    }
}

impl std::str::FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A 32-byte transaction hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from `0x` + 64 hex digits
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a well-formed hash
    pub fn parse(input: &str) -> CoreResult<Self> {
        if !TX_HASH_PATTERN.is_match(input) {
            return Err(CoreError::InvalidHash {
                reason: format!("expected 0x followed by 64 hex digits, got {}", input),
            });
        }
        let bytes = hex::decode(&input[2..]).map_err(|_| CoreError::InvalidHash {
            reason: "invalid hex".to_string(),
        })?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Canonical lowercase form, `0x`-prefixed
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for TxHash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_hex()
    }
}
