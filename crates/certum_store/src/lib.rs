//! CERTUM Store
//!
//! The in-memory certificate set shared by scans and issuance, and the
//! local mirror that seeds it at startup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod mirror;
pub mod repository;

pub use error::{MirrorError, MirrorResult};
pub use mirror::{CertificateMirror, MemoryMirror, RedbMirror};
pub use repository::{CertificateRepository, ScanToken};
