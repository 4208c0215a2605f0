//! CERTUM Ledger Interfaces
//!
//! Boundary traits for the collaborators the coordinator talks to: the
//! read-only ledger provider, the signing ledger writer, the connected
//! wallet session, and the decentralized storage client. No transport is
//! implemented here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod event;
pub mod storage;
pub mod wallet;

pub use client::{
    IssueRequest, LedgerReader, LedgerWriter, MintRequest, Organization, RegistrationRequest,
    Submission,
};
pub use error::{FailureSignal, LedgerError, LedgerResult};
pub use event::{EventStream, IssuedEvent, MintedEvent};
pub use storage::{MetadataInput, StorageClient};
pub use wallet::WalletSession;
