//! CERTUM Query
//!
//! Narrows the merged certificate set to the visible subset. Filtering is a
//! pure function of the records and a [`FilterState`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod filter;
pub mod state;

pub use filter::FilterEngine;
pub use state::{ContractFilter, FilterState};
