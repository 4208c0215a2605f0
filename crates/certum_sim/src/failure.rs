//! Failure injection for testing fault tolerance.

use certum_core::{BlockNumber, CertificateId};
use certum_ledger::{EventStream, LedgerError};
use std::collections::HashSet;

/// Faults the simulated ledger should produce
///
/// Window faults are keyed by the window's first block, so they are only
/// meaningful for a fixed window width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailurePlan {
    /// Chain head read fails (whole-scan fault)
    pub head_unavailable: bool,
    /// Log queries that fail, by stream and window start
    pub failing_windows: HashSet<(EventStream, BlockNumber)>,
    /// Point lookups that fail, by id and contract
    pub failing_lookups: HashSet<(CertificateId, bool)>,
    /// Error returned by the next write, consumed on use
    pub next_write: Option<LedgerError>,
    /// Next write succeeds but its receipt carries no identifier
    pub next_write_without_id: bool,
    /// Issuer-role query fails
    pub role_query_fails: bool,
}

impl FailurePlan {
    /// Create a plan with no failures
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the chain head unreadable
    #[must_use]
    pub fn with_head_unavailable(mut self) -> Self {
        self.head_unavailable = true;
        self
    }

    /// Fail the log query for the window starting at `from_block`
    #[must_use]
    pub fn with_failing_window(mut self, stream: EventStream, from_block: BlockNumber) -> Self {
        self.failing_windows.insert((stream, from_block));
        self
    }

    /// Fail the point lookup of `id`
    #[must_use]
    pub fn with_failing_lookup(mut self, id: CertificateId, is_nft: bool) -> Self {
        self.failing_lookups.insert((id, is_nft));
        self
    }

    /// Reject the next write with `error`
    #[must_use]
    pub fn with_write_failure(mut self, error: LedgerError) -> Self {
        self.next_write = Some(error);
        self
    }

    /// Drop the identifier from the next write receipt
    #[must_use]
    pub fn with_write_without_id(mut self) -> Self {
        self.next_write_without_id = true;
        self
    }

    /// Fail the issuer-role query
    #[must_use]
    pub fn with_role_query_failure(mut self) -> Self {
        self.role_query_fails = true;
        self
    }

    /// Whether the window query should fail
    #[must_use]
    pub fn window_fails(&self, stream: EventStream, from_block: BlockNumber) -> bool {
        self.failing_windows.contains(&(stream, from_block))
    }

    /// Whether the point lookup should fail
    #[must_use]
    pub fn lookup_fails(&self, id: &CertificateId, is_nft: bool) -> bool {
        self.failing_lookups.contains(&(id.clone(), is_nft))
    }

    /// Take the pending write failure, if any
    pub fn take_write_failure(&mut self) -> Option<LedgerError> {
        self.next_write.take()
    }
}
