//! CERTUM Deterministic Simulation
//!
//! In-memory ledger and storage collaborators with failure injection.
//! Histories are described by JSON fixtures and replay identically.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod failure;
pub mod fixture;
pub mod ledger;
pub mod storage;

pub use failure::FailurePlan;
pub use fixture::{FixtureEntry, FixtureError, FixtureOrganization, SimFixture, derive_tx_hash};
pub use ledger::{RANGE_LIMIT_CODE, SimLedger};
pub use storage::{SIM_GATEWAY, SimStorage};
