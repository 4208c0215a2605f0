//! JSON fixture files describing a simulated ledger history.

use certum_core::{Address, BlockNumber, Certificate, CertificateId, TxHash};
use certum_ledger::Organization;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixture errors
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// File could not be read or written
    #[error("fixture I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid fixture
    #[error("fixture is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One log entry plus the record its point lookup resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureEntry {
    /// Block the log was included in
    pub block_number: BlockNumber,
    /// Emitting transaction
    pub transaction_hash: TxHash,
    /// Identifier carried by the log; absent simulates a malformed log
    #[serde(default)]
    pub certificate_id: Option<CertificateId>,
    /// Record returned by the point lookup; absent simulates an empty slot
    #[serde(default)]
    pub certificate: Option<Certificate>,
}

impl FixtureEntry {
    fn resolved(certificate: Certificate, block_number: BlockNumber, seq: usize) -> Self {
        Self {
            block_number,
            transaction_hash: derive_tx_hash("fixture", seq as u64),
            certificate_id: Some(certificate.id.clone()),
            certificate: Some(certificate),
        }
    }
}

/// Deterministic transaction hash for simulated transactions
#[must_use]
pub fn derive_tx_hash(tag: &str, n: u64) -> TxHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tag.as_bytes());
    hasher.update(&n.to_le_bytes());
    TxHash::from_bytes(*hasher.finalize().as_bytes())
}

/// Registered organization keyed by its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureOrganization {
    /// Registering account
    pub owner: Address,
    /// Profile
    pub profile: Organization,
}

/// Complete simulated ledger history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimFixture {
    /// Network served by the simulated endpoint
    pub chain_id: u64,
    /// Current chain head
    pub head: BlockNumber,
    /// Next identifier handed out by a write
    pub next_id: u64,
    /// Standard contract history
    #[serde(default)]
    pub standard: Vec<FixtureEntry>,
    /// NFT contract history
    #[serde(default)]
    pub nft: Vec<FixtureEntry>,
    /// Accounts holding the issuer capability
    #[serde(default)]
    pub issuers: Vec<Address>,
    /// Registered organizations
    #[serde(default)]
    pub organizations: Vec<FixtureOrganization>,
}

impl SimFixture {
    /// Empty history on `chain_id`
    #[must_use]
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            head: 0,
            next_id: 1,
            standard: Vec::new(),
            nft: Vec::new(),
            issuers: Vec::new(),
            organizations: Vec::new(),
        }
    }

    /// Set the chain head
    #[must_use]
    pub fn with_head(mut self, head: BlockNumber) -> Self {
        self.head = head;
        self
    }

    /// Append a standard "issued" log resolving to `certificate`
    #[must_use]
    pub fn with_standard(mut self, certificate: Certificate, block_number: BlockNumber) -> Self {
        let entry = FixtureEntry::resolved(certificate, block_number, self.standard.len());
        self.head = self.head.max(block_number);
        self.standard.push(entry);
        self
    }

    /// Append an NFT "minted" log resolving to `certificate`
    #[must_use]
    pub fn with_nft(mut self, certificate: Certificate, block_number: BlockNumber) -> Self {
        let entry = FixtureEntry::resolved(certificate, block_number, 1_000_000 + self.nft.len());
        self.head = self.head.max(block_number);
        self.nft.push(entry);
        self
    }

    /// Append a raw log entry to one stream
    #[must_use]
    pub fn with_entry(mut self, nft: bool, entry: FixtureEntry) -> Self {
        self.head = self.head.max(entry.block_number);
        if nft {
            self.nft.push(entry);
        } else {
            self.standard.push(entry);
        }
        self
    }

    /// Grant the issuer capability
    #[must_use]
    pub fn with_issuer(mut self, address: Address) -> Self {
        self.issuers.push(address);
        self
    }

    /// Register an organization for `owner`
    #[must_use]
    pub fn with_organization(mut self, owner: Address, profile: Organization) -> Self {
        self.organizations.retain(|org| org.owner != owner);
        self.organizations.push(FixtureOrganization { owner, profile });
        self
    }

    /// Load a fixture from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write the fixture as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FixtureError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let mut fixture = SimFixture::new(11155111);
        fixture.head = 500;
        fixture.issuers.push(Address::from_bytes([7; 20]));
        fixture.save(&path).unwrap();

        let loaded = SimFixture::load(&path).unwrap();
        assert_eq!(loaded, fixture);
    }

    #[test]
    fn test_fixture_builders_track_head() {
        let cert = Certificate::new(
            CertificateId::new("1"),
            "Ada",
            Address::from_bytes([1; 20]),
            "Degree",
            "Uni",
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        let fixture = SimFixture::new(1).with_standard(cert.clone(), 40).with_nft(cert, 25);
        assert_eq!(fixture.head, 40);
        assert_ne!(fixture.standard[0].transaction_hash, fixture.nft[0].transaction_hash);
    }

    #[test]
    fn test_derive_tx_hash_is_deterministic() {
        assert_eq!(derive_tx_hash("a", 1), derive_tx_hash("a", 1));
        assert_ne!(derive_tx_hash("a", 1), derive_tx_hash("a", 2));
    }

    #[test]
    fn test_fixture_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SimFixture::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn test_fixture_defaults_optional_sections() {
        let fixture: SimFixture =
            serde_json::from_str(r#"{"chain_id": 1, "head": 10, "next_id": 3}"#).unwrap();
        assert!(fixture.standard.is_empty());
        assert!(fixture.organizations.is_empty());
    }
}
