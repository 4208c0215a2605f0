//! CERTUM Event Scanner
//!
//! Rebuilds the certificate set by replaying both contract event streams
//! in bounded block windows, then collapsing the raw records into one per
//! certificate id.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod merge;
pub mod progress;
pub mod scanner;

pub use merge::{merge_certificates, sort_certificates};
pub use progress::ScanProgress;
pub use scanner::{LedgerEventScanner, ScanConfig, ScanError, ScanReport};
