//! Windowed, partial-failure-tolerant replay of certificate events.

use crate::merge::merge_certificates;
use crate::progress::ScanProgress;
use certum_core::{BlockNumber, Certificate, CertificateId, ScanWindow, TxHash};
use certum_ledger::{EventStream, LedgerReader, LedgerResult, WalletSession};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default per-query block ceiling of public read providers
pub const DEFAULT_PROVIDER_CEILING: u64 = 10_000;

/// Sepolia
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// First block to replay (contract deployment height or genesis)
    pub lower_bound: BlockNumber,
    /// Requested blocks per window
    pub window_width: u64,
    /// Provider's hard per-query ceiling; windows stay strictly below it
    pub provider_ceiling: u64,
    /// Network the certificate contracts live on
    pub required_chain_id: u64,
}

impl ScanConfig {
    /// Create a config for `required_chain_id`
    #[must_use]
    pub fn new(required_chain_id: u64) -> Self {
        Self {
            lower_bound: 0,
            window_width: DEFAULT_PROVIDER_CEILING - 1,
            provider_ceiling: DEFAULT_PROVIDER_CEILING,
            required_chain_id,
        }
    }

    /// Set the first block to replay
    #[must_use]
    pub fn with_lower_bound(mut self, block: BlockNumber) -> Self {
        self.lower_bound = block;
        self
    }

    /// Set the requested window width
    #[must_use]
    pub fn with_window_width(mut self, width: u64) -> Self {
        self.window_width = width;
        self
    }

    /// Set the provider ceiling
    #[must_use]
    pub fn with_provider_ceiling(mut self, ceiling: u64) -> Self {
        self.provider_ceiling = ceiling;
        self
    }

    /// Window width actually used: at least one, strictly below the ceiling
    #[must_use]
    pub fn effective_width(&self) -> u64 {
        let max = self.provider_ceiling.saturating_sub(1).max(1);
        self.window_width.clamp(1, max)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_ID)
    }
}

/// Whole-scan faults; partial work is abandoned
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Chain head could not be read
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Raw scan output with fault accounting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Resolved records in scan order; duplicates possible
    pub records: Vec<Certificate>,
    /// Chain head the scan ran up to
    pub head: BlockNumber,
    /// Window queries that succeeded, both streams
    pub windows_scanned: usize,
    /// Window queries that failed and were skipped
    pub failed_windows: Vec<(EventStream, ScanWindow)>,
    /// Point lookups that failed and were skipped
    pub failed_lookups: usize,
    /// Events without an id, or resolving to nothing or the sentinel
    pub skipped_events: usize,
}

impl ScanReport {
    /// Whether every window and lookup succeeded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_windows.is_empty() && self.failed_lookups == 0
    }

    /// Collapse the raw records into the merged, sorted set
    #[must_use]
    pub fn merged(&self) -> Vec<Certificate> {
        merge_certificates(self.records.iter().cloned())
    }
}

/// Event scanner over a read-only ledger handle
pub struct LedgerEventScanner<R: LedgerReader + ?Sized> {
    reader: Arc<R>,
    config: ScanConfig,
}

impl<R: LedgerReader + ?Sized> LedgerEventScanner<R> {
    /// Create a scanner with default config
    #[must_use]
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            reader,
            config: ScanConfig::default(),
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Replay both streams
    ///
    /// # Errors
    ///
    /// Returns error if the chain head cannot be read
    pub async fn scan(&self, wallet: Option<&WalletSession>) -> Result<ScanReport, ScanError> {
        self.scan_with_progress(wallet, |_| {}).await
    }

    /// Replay both streams, reporting progress after every window
    ///
    /// The standard stream is replayed in full before the NFT stream, each
    /// in ascending block order; the merge step relies on that order.
    ///
    /// # Errors
    ///
    /// Returns error if the chain head cannot be read
    pub async fn scan_with_progress<F>(
        &self,
        wallet: Option<&WalletSession>,
        mut on_progress: F,
    ) -> Result<ScanReport, ScanError>
    where
        F: FnMut(ScanProgress),
    {
        self.check_network(wallet).await;

        let head = self
            .reader
            .block_number()
            .await
            .map_err(|err| ScanError::ProviderUnavailable(err.to_string()))?;

        let mut report = ScanReport {
            head,
            ..ScanReport::default()
        };

        let lower = self.config.lower_bound;
        if lower > head {
            tracing::info!(lower, head, "lower bound above chain head; nothing to scan");
            return Ok(report);
        }

        let width = self.config.effective_width();
        let windows: Vec<ScanWindow> = ScanWindow::partition(lower, head, width).collect();
        let total_blocks = (head - lower).saturating_add(1);
        tracing::info!(
            lower,
            head,
            width,
            windows = windows.len(),
            "scanning certificate events"
        );

        for stream in [EventStream::StandardIssued, EventStream::NftMinted] {
            let mut blocks_scanned = 0u64;
            for window in &windows {
                match self.scan_window(stream, *window, &mut report).await {
                    Ok(()) => report.windows_scanned += 1,
                    Err(err) => {
                        tracing::warn!(%stream, %window, error = %err, "window query failed; skipping");
                        report.failed_windows.push((stream, *window));
                    }
                }
                blocks_scanned = blocks_scanned.saturating_add(window.block_count());
                on_progress(ScanProgress {
                    stream,
                    blocks_scanned,
                    total_blocks,
                });
            }
        }

        tracing::info!(
            records = report.records.len(),
            failed_windows = report.failed_windows.len(),
            failed_lookups = report.failed_lookups,
            "scan finished"
        );
        Ok(report)
    }

    /// Network identity check; never blocks discovery
    async fn check_network(&self, wallet: Option<&WalletSession>) {
        let required = self.config.required_chain_id;
        match wallet {
            None => tracing::debug!("no wallet attached; scanning through the read endpoint"),
            Some(session) if !session.network_matches(required) => tracing::warn!(
                wallet_chain = ?session.chain_id,
                required,
                "wallet is on the wrong network; scanning through the read endpoint"
            ),
            Some(_) => {}
        }
        match self.reader.chain_id().await {
            Ok(chain) if chain != required => {
                tracing::warn!(chain, required, "read endpoint serves a different network")
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "network check failed; continuing scan"),
        }
    }

    async fn scan_window(
        &self,
        stream: EventStream,
        window: ScanWindow,
        report: &mut ScanReport,
    ) -> LedgerResult<()> {
        let events = self.window_events(stream, window).await?;
        tracing::debug!(%stream, %window, events = events.len(), "window queried");

        let is_nft = stream.is_nft();
        for (id, tx) in events {
            let Some(id) = id else {
                report.skipped_events += 1;
                continue;
            };
            match self.reader.certificate(&id, is_nft).await {
                Ok(Some(record)) if !record.is_burned() => {
                    let mut record = record.with_transaction(tx);
                    record.is_nft = is_nft;
                    report.records.push(record);
                }
                Ok(_) => report.skipped_events += 1,
                Err(err) => {
                    tracing::warn!(%stream, %id, error = %err, "certificate lookup failed; skipping");
                    report.failed_lookups += 1;
                }
            }
        }
        Ok(())
    }

    async fn window_events(
        &self,
        stream: EventStream,
        window: ScanWindow,
    ) -> LedgerResult<Vec<(Option<CertificateId>, TxHash)>> {
        Ok(match stream {
            EventStream::StandardIssued => self
                .reader
                .issued_events(window)
                .await?
                .into_iter()
                .map(|event| (event.certificate_id, event.transaction_hash))
                .collect(),
            EventStream::NftMinted => self
                .reader
                .minted_events(window)
                .await?
                .into_iter()
                .map(|event| (event.token_id, event.transaction_hash))
                .collect(),
        })
    }
}
