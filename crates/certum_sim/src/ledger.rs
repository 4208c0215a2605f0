//! In-memory ledger implementing both collaborator traits.

use crate::failure::FailurePlan;
use crate::fixture::{FixtureEntry, FixtureOrganization, SimFixture, derive_tx_hash};
use async_trait::async_trait;
use certum_core::{
    Address, BlockNumber, Certificate, CertificateId, ScanWindow, TxHash, parse_calendar_date,
};
use certum_ledger::{
    EventStream, IssueRequest, IssuedEvent, LedgerError, LedgerReader, LedgerResult, LedgerWriter,
    MintRequest, MintedEvent, Organization, RegistrationRequest, Submission,
};
use tokio::sync::RwLock;

/// Error code providers use for oversized log queries
pub const RANGE_LIMIT_CODE: i64 = -32005;

#[derive(Debug)]
struct SimState {
    fixture: SimFixture,
    failures: FailurePlan,
    writes: usize,
    lookups: usize,
    tx_counter: u64,
}

/// Simulated ledger
///
/// Reads replay the fixture history; writes append to it and advance the
/// chain head by one block each.
pub struct SimLedger {
    state: RwLock<SimState>,
    /// Provider ceiling on blocks per log query
    max_block_range: Option<u64>,
}

impl SimLedger {
    /// Create from a fixture
    #[must_use]
    pub fn new(fixture: SimFixture) -> Self {
        // Seeded from the head so reloaded fixtures never reuse a hash
        let tx_counter = fixture.head;
        Self {
            state: RwLock::new(SimState {
                fixture,
                failures: FailurePlan::new(),
                writes: 0,
                lookups: 0,
                tx_counter,
            }),
            max_block_range: None,
        }
    }

    /// Set the failure plan
    #[must_use]
    pub fn with_failures(mut self, plan: FailurePlan) -> Self {
        self.state.get_mut().failures = plan;
        self
    }

    /// Reject log queries spanning more than `blocks`
    #[must_use]
    pub fn with_max_block_range(mut self, blocks: u64) -> Self {
        self.max_block_range = Some(blocks);
        self
    }

    /// Replace the failure plan at runtime
    pub async fn inject(&self, plan: FailurePlan) {
        self.state.write().await.failures = plan;
    }

    /// Current history, including writes made through this ledger
    pub async fn fixture(&self) -> SimFixture {
        self.state.read().await.fixture.clone()
    }

    /// Number of accepted writes
    pub async fn write_count(&self) -> usize {
        self.state.read().await.writes
    }

    /// Number of point lookups served
    pub async fn lookup_count(&self) -> usize {
        self.state.read().await.lookups
    }

    fn check_range(&self, window: ScanWindow) -> LedgerResult<()> {
        match self.max_block_range {
            Some(limit) if window.block_count() > limit => Err(LedgerError::Rpc {
                code: Some(RANGE_LIMIT_CODE),
                message: format!(
                    "query exceeds max block range {} (requested {})",
                    limit,
                    window.block_count()
                ),
            }),
            _ => Ok(()),
        }
    }

    fn entries_in(entries: &[FixtureEntry], window: ScanWindow) -> impl Iterator<Item = &FixtureEntry> {
        entries.iter().filter(move |entry| window.contains(entry.block_number))
    }
}

impl SimState {
    fn next_tx(&mut self) -> TxHash {
        self.tx_counter += 1;
        derive_tx_hash("write", self.tx_counter)
    }

    fn next_id(&mut self) -> CertificateId {
        let id = CertificateId::from(self.fixture.next_id);
        self.fixture.next_id += 1;
        id
    }

    fn advance_head(&mut self) -> BlockNumber {
        self.fixture.head += 1;
        self.fixture.head
    }

    fn organization(&self, owner: &Address) -> Option<&Organization> {
        self.fixture
            .organizations
            .iter()
            .find(|org| org.owner == *owner)
            .map(|org| &org.profile)
    }

    /// Shared preamble for writes: injected failure, then counters
    fn begin_write(&mut self) -> LedgerResult<()> {
        if let Some(err) = self.failures.take_write_failure() {
            return Err(err);
        }
        Ok(())
    }

    fn finish_write(&mut self, id: CertificateId, tx: TxHash) -> Submission {
        self.writes += 1;
        let certificate_id = if self.failures.next_write_without_id {
            self.failures.next_write_without_id = false;
            None
        } else {
            Some(id)
        };
        Submission {
            certificate_id,
            transaction_hash: tx,
        }
    }
}

fn parse_date_arg(field: &str, value: &str) -> LedgerResult<chrono::NaiveDate> {
    parse_calendar_date(value).map_err(|_| LedgerError::Reverted {
        reason: format!("invalid {}", field),
    })
}

#[async_trait]
impl LedgerReader for SimLedger {
    async fn chain_id(&self) -> LedgerResult<u64> {
        Ok(self.state.read().await.fixture.chain_id)
    }

    async fn block_number(&self) -> LedgerResult<BlockNumber> {
        let state = self.state.read().await;
        if state.failures.head_unavailable {
            return Err(LedgerError::Unavailable {
                message: "could not detect network".to_string(),
            });
        }
        Ok(state.fixture.head)
    }

    async fn issued_events(&self, window: ScanWindow) -> LedgerResult<Vec<IssuedEvent>> {
        self.check_range(window)?;
        let state = self.state.read().await;
        if state
            .failures
            .window_fails(EventStream::StandardIssued, window.from_block)
        {
            return Err(LedgerError::Rpc {
                code: Some(-32603),
                message: format!("log query failed for {}", window),
            });
        }
        Ok(Self::entries_in(&state.fixture.standard, window)
            .map(|entry| IssuedEvent {
                certificate_id: entry.certificate_id.clone(),
                transaction_hash: entry.transaction_hash,
                block_number: entry.block_number,
            })
            .collect())
    }

    async fn minted_events(&self, window: ScanWindow) -> LedgerResult<Vec<MintedEvent>> {
        self.check_range(window)?;
        let state = self.state.read().await;
        if state
            .failures
            .window_fails(EventStream::NftMinted, window.from_block)
        {
            return Err(LedgerError::Rpc {
                code: Some(-32603),
                message: format!("log query failed for {}", window),
            });
        }
        Ok(Self::entries_in(&state.fixture.nft, window)
            .map(|entry| MintedEvent {
                token_id: entry.certificate_id.clone(),
                transaction_hash: entry.transaction_hash,
                block_number: entry.block_number,
            })
            .collect())
    }

    async fn certificate(
        &self,
        id: &CertificateId,
        is_nft: bool,
    ) -> LedgerResult<Option<Certificate>> {
        let mut state = self.state.write().await;
        state.lookups += 1;
        if state.failures.lookup_fails(id, is_nft) {
            return Err(LedgerError::Rpc {
                code: None,
                message: format!("call exception while reading {}", id),
            });
        }
        let entries = if is_nft {
            &state.fixture.nft
        } else {
            &state.fixture.standard
        };
        // The contract slot holds whatever was written last for this id
        Ok(entries
            .iter()
            .rev()
            .filter_map(|entry| entry.certificate.as_ref())
            .find(|cert| cert.id == *id)
            .cloned())
    }

    async fn has_issuer_role(&self, address: &Address) -> LedgerResult<bool> {
        let state = self.state.read().await;
        if state.failures.role_query_fails {
            return Err(LedgerError::Rpc {
                code: None,
                message: "missing revert data in call exception".to_string(),
            });
        }
        Ok(state.fixture.issuers.contains(address))
    }

    async fn organization(&self, address: &Address) -> LedgerResult<Option<Organization>> {
        Ok(self.state.read().await.organization(address).cloned())
    }
}

#[async_trait]
impl LedgerWriter for SimLedger {
    async fn issue_certificate(&self, request: IssueRequest) -> LedgerResult<Submission> {
        let mut state = self.state.write().await;
        state.begin_write()?;
        if !state.fixture.issuers.contains(&request.issuer) {
            return Err(LedgerError::Reverted {
                reason: format!(
                    "AccessControl: account {} is missing role ISSUER_ROLE",
                    request.issuer
                ),
            });
        }

        let issue_date = parse_date_arg("issue date", &request.issue_date)?;
        let id = state.next_id();
        let mut certificate = Certificate::new(
            id.clone(),
            request.recipient_name,
            request.recipient_address,
            request.certificate_type,
            request.institution_name,
            issue_date,
        );
        if let Some(expiry) = request.expiration_date.as_deref() {
            certificate = certificate.with_expiration(parse_date_arg("expiration date", expiry)?);
        }
        certificate.additional_details = request.additional_details;
        certificate.document_hash = request.document_hash;

        let tx = state.next_tx();
        let block_number = state.advance_head();
        state.fixture.standard.push(FixtureEntry {
            block_number,
            transaction_hash: tx,
            certificate_id: Some(id.clone()),
            certificate: Some(certificate),
        });
        tracing::debug!(%id, block_number, "sim: issued standard certificate");
        Ok(state.finish_write(id, tx))
    }

    async fn mint_certificate(&self, request: MintRequest) -> LedgerResult<Submission> {
        let mut state = self.state.write().await;
        state.begin_write()?;
        if !state
            .organization(&request.issuer)
            .is_some_and(|org| org.registered)
        {
            return Err(LedgerError::Reverted {
                reason: "Organization not registered".to_string(),
            });
        }

        let issue_date = parse_date_arg("issue date", &request.issue_date)?;
        let id = state.next_id();
        let mut certificate = Certificate::new(
            id.clone(),
            request.recipient_name,
            request.recipient_address,
            request.certificate_type,
            request.institution_name,
            issue_date,
        )
        .as_nft(Some(request.recipient_address));
        if let Some(expiry) = request.expiration_date.as_deref() {
            certificate = certificate.with_expiration(parse_date_arg("expiration date", expiry)?);
        }

        let tx = state.next_tx();
        let block_number = state.advance_head();
        state.fixture.nft.push(FixtureEntry {
            block_number,
            transaction_hash: tx,
            certificate_id: Some(id.clone()),
            certificate: Some(certificate),
        });
        tracing::debug!(%id, block_number, metadata = %request.metadata_url, "sim: minted certificate");
        Ok(state.finish_write(id, tx))
    }

    async fn register_organization(&self, request: RegistrationRequest) -> LedgerResult<TxHash> {
        let mut state = self.state.write().await;
        state.begin_write()?;
        let owner = request.owner;
        let profile = Organization::registered(request.name, request.logo_url, request.brand_color);
        state.fixture.organizations.retain(|org| org.owner != owner);
        state
            .fixture
            .organizations
            .push(FixtureOrganization { owner, profile });
        state.writes += 1;
        state.advance_head();
        Ok(state.next_tx())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn issuer() -> Address {
        Address::from_bytes([0xaa; 20])
    }

    fn cert(id: &str) -> Certificate {
        Certificate::new(
            CertificateId::new(id),
            "Grace Hopper",
            Address::from_bytes([0x11; 20]),
            "Compiler Award",
            "Navy School",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
    }

    fn issue_request() -> IssueRequest {
        IssueRequest {
            issuer: issuer(),
            recipient_name: "Grace Hopper".to_string(),
            recipient_address: Address::from_bytes([0x11; 20]),
            certificate_type: "Compiler Award".to_string(),
            institution_name: "Navy School".to_string(),
            issue_date: "2025-01-01".to_string(),
            expiration_date: None,
            additional_details: None,
            document_hash: None,
        }
    }

    #[tokio::test]
    async fn test_events_filtered_by_window() {
        let fixture = SimFixture::new(1)
            .with_standard(cert("1"), 5)
            .with_standard(cert("2"), 15);
        let ledger = SimLedger::new(fixture);

        let events = ledger.issued_events(ScanWindow::new(0, 9)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].certificate_id, Some(CertificateId::new("1")));
    }

    #[tokio::test]
    async fn test_range_ceiling_enforced() {
        let ledger = SimLedger::new(SimFixture::new(1).with_head(100)).with_max_block_range(10);
        let err = ledger
            .issued_events(ScanWindow::new(0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rpc { code: Some(RANGE_LIMIT_CODE), .. }));
        assert!(ledger.issued_events(ScanWindow::new(0, 9)).await.is_ok());
    }

    #[tokio::test]
    async fn test_point_lookup_returns_latest_record() {
        let mut updated = cert("1");
        updated.recipient_name = "Rear Admiral Hopper".to_string();
        let fixture = SimFixture::new(1)
            .with_standard(cert("1"), 5)
            .with_standard(updated.clone(), 9);
        let ledger = SimLedger::new(fixture);

        let found = ledger
            .certificate(&CertificateId::new("1"), false)
            .await
            .unwrap();
        assert_eq!(found, Some(updated));
        assert!(
            ledger
                .certificate(&CertificateId::new("1"), true)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(ledger.lookup_count().await, 2);
    }

    #[tokio::test]
    async fn test_head_unavailable() {
        let ledger = SimLedger::new(SimFixture::new(1))
            .with_failures(FailurePlan::new().with_head_unavailable());
        assert!(matches!(
            ledger.block_number().await,
            Err(LedgerError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_issue_requires_role() {
        let ledger = SimLedger::new(SimFixture::new(1));
        let err = ledger.issue_certificate(issue_request()).await.unwrap_err();
        assert!(err.to_string().contains("missing role"));
        assert_eq!(ledger.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_issue_appends_history() {
        let ledger = SimLedger::new(SimFixture::new(1).with_head(10).with_issuer(issuer()));
        let submission = ledger.issue_certificate(issue_request()).await.unwrap();

        let id = submission.certificate_id.unwrap();
        assert_eq!(id.as_str(), "1");
        let fixture = ledger.fixture().await;
        assert_eq!(fixture.head, 11);
        assert_eq!(fixture.standard.len(), 1);
        assert_eq!(fixture.standard[0].transaction_hash, submission.transaction_hash);
    }

    #[tokio::test]
    async fn test_write_without_id() {
        let ledger = SimLedger::new(SimFixture::new(1).with_issuer(issuer()))
            .with_failures(FailurePlan::new().with_write_without_id());
        let first = ledger.issue_certificate(issue_request()).await.unwrap();
        assert!(first.certificate_id.is_none());
        let second = ledger.issue_certificate(issue_request()).await.unwrap();
        assert!(second.certificate_id.is_some());
    }

    #[tokio::test]
    async fn test_mint_requires_registration() {
        let ledger = SimLedger::new(SimFixture::new(1));
        let request = MintRequest {
            issuer: issuer(),
            recipient_address: Address::from_bytes([0x11; 20]),
            recipient_name: "Grace".to_string(),
            certificate_type: "Award".to_string(),
            institution_name: "Navy".to_string(),
            issue_date: "2025-01-01".to_string(),
            expiration_date: None,
            metadata_url: "https://gateway.sim/ipfs/x".to_string(),
        };
        let err = ledger.mint_certificate(request.clone()).await.unwrap_err();
        assert!(err.to_string().contains("not registered"));

        ledger
            .register_organization(RegistrationRequest {
                owner: issuer(),
                name: "Navy".to_string(),
                logo_url: "https://gateway.sim/ipfs/logo".to_string(),
                brand_color: "#112233".to_string(),
            })
            .await
            .unwrap();
        let submission = ledger.mint_certificate(request).await.unwrap();
        let minted = ledger
            .certificate(submission.certificate_id.as_ref().unwrap(), true)
            .await
            .unwrap()
            .unwrap();
        assert!(minted.is_nft);
        assert_eq!(minted.owner, Some(Address::from_bytes([0x11; 20])));
    }
}
