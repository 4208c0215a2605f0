//! CERTUM Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Every type that reaches the persisted mirror or the ledger boundary is
//! serializable with a stable JSON shape.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod certificate;
pub mod date;
pub mod error;
pub mod explorer;
pub mod id;
pub mod window;

// Re-exports
pub use address::{Address, TxHash};
pub use certificate::{Certificate, CertificateStatus};
pub use date::parse_calendar_date;
pub use error::{CoreError, CoreResult};
pub use explorer::ExplorerLinks;
pub use id::{BlockNumber, CertificateId};
pub use window::{ScanWindow, WindowPartition};
