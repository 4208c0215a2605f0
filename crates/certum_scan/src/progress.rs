//! Scan progress reporting.

use certum_ledger::EventStream;
use serde::{Deserialize, Serialize};

/// Blocks replayed so far for one event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Stream being replayed
    pub stream: EventStream,
    /// Blocks covered by finished windows
    pub blocks_scanned: u64,
    /// Blocks in the whole span
    pub total_blocks: u64,
}

impl ScanProgress {
    /// Percentage of the span covered, 0..=100
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total_blocks == 0 {
            return 100;
        }
        let pct = u128::from(self.blocks_scanned.min(self.total_blocks)) * 100
            / u128::from(self.total_blocks);
        pct as u8
    }

    /// Whether the stream is fully replayed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.blocks_scanned >= self.total_blocks
    }
}
