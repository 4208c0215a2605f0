//! Block-range windows for log queries.
//!
//! Read providers reject log queries spanning too many blocks, so history is
//! replayed as a sequence of consecutive inclusive windows.

use crate::id::BlockNumber;
use serde::{Deserialize, Serialize};

/// Inclusive block range `[from_block, to_block]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScanWindow {
    /// First block, inclusive
    pub from_block: BlockNumber,
    /// Last block, inclusive
    pub to_block: BlockNumber,
}

impl ScanWindow {
    /// Create a new window
    #[must_use]
    pub const fn new(from_block: BlockNumber, to_block: BlockNumber) -> Self {
        Self {
            from_block,
            to_block,
        }
    }

    /// Number of blocks covered; zero when the bounds are inverted
    #[must_use]
    pub const fn block_count(&self) -> u64 {
        if self.to_block < self.from_block {
            return 0;
        }
        (self.to_block - self.from_block).saturating_add(1)
    }

    /// Whether a block falls inside this window
    #[must_use]
    pub const fn contains(&self, block: BlockNumber) -> bool {
        block >= self.from_block && block <= self.to_block
    }

    /// Partition `[lower, upper]` into consecutive windows of at most `width` blocks
    ///
    /// A width of zero is treated as one.
    #[must_use]
    pub fn partition(lower: BlockNumber, upper: BlockNumber, width: u64) -> WindowPartition {
        WindowPartition {
            next: (lower <= upper).then_some(lower),
            upper,
            width: width.max(1),
        }
    }
}

impl std::fmt::Display for ScanWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.from_block, self.to_block)
    }
}

/// Iterator over the windows covering a block span, ascending
#[derive(Debug, Clone)]
pub struct WindowPartition {
    next: Option<BlockNumber>,
    upper: BlockNumber,
    width: u64,
}

impl Iterator for WindowPartition {
    type Item = ScanWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.next?;
        let to = from.saturating_add(self.width - 1).min(self.upper);
        self.next = if to >= self.upper { None } else { Some(to + 1) };
        Some(ScanWindow::new(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_partition_exact_multiple() {
        let windows: Vec<_> = ScanWindow::partition(0, 29, 10).collect();
        assert_eq!(
            windows,
            vec![
                ScanWindow::new(0, 9),
                ScanWindow::new(10, 19),
                ScanWindow::new(20, 29)
            ]
        );
    }

    #[test]
    fn test_partition_remainder() {
        let windows: Vec<_> = ScanWindow::partition(5, 27, 10).collect();
        assert_eq!(windows.last(), Some(&ScanWindow::new(25, 27)));
        assert_eq!(windows.len(), 3);
    }

    #[test]
    fn test_partition_empty_span() {
        assert_eq!(ScanWindow::partition(10, 9, 5).count(), 0);
    }

    #[test]
    fn test_partition_single_block() {
        let windows: Vec<_> = ScanWindow::partition(7, 7, 100).collect();
        assert_eq!(windows, vec![ScanWindow::new(7, 7)]);
    }

    #[test]
    fn test_partition_reaches_max_block() {
        let windows: Vec<_> = ScanWindow::partition(u64::MAX - 2, u64::MAX, 2).collect();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1].to_block, u64::MAX);
    }

    #[test]
    fn test_window_contains() {
        let window = ScanWindow::new(10, 20);
        assert!(window.contains(10));
        assert!(window.contains(20));
        assert!(!window.contains(21));
        assert_eq!(window.block_count(), 11);
    }

    #[test]
    fn test_block_count_inverted_and_full_range() {
        assert_eq!(ScanWindow::new(10, 9).block_count(), 0);
        assert!(!ScanWindow::new(10, 9).contains(10));
        assert_eq!(ScanWindow::new(0, u64::MAX).block_count(), u64::MAX);
    }

    proptest! {
        #[test]
        fn prop_partition_covers_span(lower in 0u64..5_000, len in 0u64..5_000, width in 1u64..700) {
            let upper = lower + len;
            let windows: Vec<_> = ScanWindow::partition(lower, upper, width).collect();
            prop_assert_eq!(windows.first().map(|w| w.from_block), Some(lower));
            prop_assert_eq!(windows.last().map(|w| w.to_block), Some(upper));
            for pair in windows.windows(2) {
                prop_assert_eq!(pair[0].to_block + 1, pair[1].from_block);
            }
            for w in &windows {
                prop_assert!(w.block_count() <= width);
            }
            let total: u64 = windows.iter().map(ScanWindow::block_count).sum();
            prop_assert_eq!(total, len + 1);
        }
    }
}
