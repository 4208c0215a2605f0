//! Shared cached certificate set.

use crate::error::MirrorResult;
use crate::mirror::CertificateMirror;
use certum_core::{Certificate, CertificateId};
use certum_scan::merge_certificates;
use tokio::sync::RwLock;

/// Ticket identifying one scan; only the latest ticket may publish results
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScanToken(u64);

impl ScanToken {
    /// Generation number
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct RepoState {
    records: Vec<Certificate>,
    latest_scan: u64,
    /// Records upserted since the latest scan began
    upserted_since_scan: Vec<Certificate>,
}

/// Cached certificate set with serialized writers
///
/// A scan takes a [`ScanToken`] before it starts and publishes through
/// [`apply_scan`](Self::apply_scan). When a newer scan has started in the
/// meantime, the older result is dropped instead of overwriting newer state.
/// Records upserted while a scan is in flight survive its publication.
#[derive(Debug, Default)]
pub struct CertificateRepository {
    state: RwLock<RepoState>,
}

impl CertificateRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the persisted mirror
    ///
    /// # Errors
    ///
    /// Returns error if the mirror cannot be read
    pub async fn seed_from(&self, mirror: &dyn CertificateMirror) -> MirrorResult<usize> {
        let records = mirror.load()?;
        let count = records.len();
        self.replace_all(records).await;
        tracing::info!(records = count, "seeded certificate set from mirror");
        Ok(count)
    }

    /// Replace the whole set
    pub async fn replace_all(&self, records: Vec<Certificate>) {
        self.state.write().await.records = merge_certificates(records);
    }

    /// Insert or replace one record by id
    pub async fn upsert_one(&self, record: Certificate) {
        let mut state = self.state.write().await;
        state.upserted_since_scan.push(record.clone());
        let current = std::mem::take(&mut state.records);
        state.records = merge_certificates(current.into_iter().chain(std::iter::once(record)));
    }

    /// Register a new scan, superseding every earlier one
    pub async fn begin_scan(&self) -> ScanToken {
        let mut state = self.state.write().await;
        state.latest_scan += 1;
        state.upserted_since_scan.clear();
        ScanToken(state.latest_scan)
    }

    /// Publish scan results if `token` is still the latest
    ///
    /// Records upserted after `token` was issued are laid over the scan
    /// output, since the scan may have read history from before them.
    /// Returns whether the set was replaced.
    pub async fn apply_scan(&self, token: ScanToken, records: Vec<Certificate>) -> bool {
        let mut state = self.state.write().await;
        if token.0 != state.latest_scan {
            tracing::debug!(
                stale = token.0,
                latest = state.latest_scan,
                "discarding superseded scan result"
            );
            return false;
        }
        let upserted = std::mem::take(&mut state.upserted_since_scan);
        if !upserted.is_empty() {
            tracing::debug!(kept = upserted.len(), "keeping records upserted during scan");
        }
        state.records = merge_certificates(records.into_iter().chain(upserted));
        true
    }

    /// Copy of the current set
    pub async fn snapshot(&self) -> Vec<Certificate> {
        self.state.read().await.records.clone()
    }

    /// Number of cached records
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Whether the set is empty
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    /// Look up one record by id
    pub async fn get(&self, id: &CertificateId) -> Option<Certificate> {
        self.state
            .read()
            .await
            .records
            .iter()
            .find(|record| record.id == *id)
            .cloned()
    }

    /// Save the current set to `mirror`
    ///
    /// # Errors
    ///
    /// Returns error if the mirror cannot be written
    pub async fn persist(&self, mirror: &dyn CertificateMirror) -> MirrorResult<()> {
        let state = self.state.read().await;
        mirror.save(&state.records)
    }
}
