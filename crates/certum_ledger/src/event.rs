//! Raw contract events replayed by the scanner.

use certum_core::{BlockNumber, CertificateId, TxHash};
use serde::{Deserialize, Serialize};

/// The two independent event sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStream {
    /// "Certificate issued" on the standard contract
    StandardIssued,
    /// "Certificate minted" on the NFT contract
    NftMinted,
}

impl EventStream {
    /// Whether records from this stream are NFT-backed
    #[must_use]
    pub const fn is_nft(&self) -> bool {
        matches!(self, Self::NftMinted)
    }
}

impl std::fmt::Display for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StandardIssued => write!(f, "standard"),
            Self::NftMinted => write!(f, "nft"),
        }
    }
}

/// A "certificate issued" log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedEvent {
    /// Identifier carried by the event; absent on malformed logs
    pub certificate_id: Option<CertificateId>,
    /// Emitting transaction
    pub transaction_hash: TxHash,
    /// Block the log was included in
    pub block_number: BlockNumber,
}

/// A "certificate minted" log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedEvent {
    /// Token identifier carried by the event; absent on malformed logs
    pub token_id: Option<CertificateId>,
    /// Emitting transaction
    pub transaction_hash: TxHash,
    /// Block the log was included in
    pub block_number: BlockNumber,
}
