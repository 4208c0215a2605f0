//! Three-stage filter pipeline: contract type, ownership, free text.

use crate::state::{ContractFilter, FilterState};
use certum_core::{Address, Certificate};

/// Stateless filter engine
///
/// Each stage narrows the previous stage's output, so a record survives
/// only if every active stage admits it. Input order is preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    /// Create a filter engine
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Visible subset of `records` under `state`
    #[must_use]
    pub fn apply(&self, records: &[Certificate], state: &FilterState) -> Vec<Certificate> {
        let typed = Self::by_contract_type(records, state.contract_type);
        let owned = match state.ownership_target() {
            Some(address) => Self::by_owner(&typed, address),
            None => typed,
        };
        match state.normalized_query() {
            Some(query) => Self::by_text(&owned, &query),
            None => owned,
        }
    }

    /// Contract-type stage
    #[must_use]
    pub fn by_contract_type(records: &[Certificate], filter: ContractFilter) -> Vec<Certificate> {
        records
            .iter()
            .filter(|record| filter.admits(record.is_nft))
            .cloned()
            .collect()
    }

    /// Ownership stage: recipient or current holder equals `address`
    #[must_use]
    pub fn by_owner(records: &[Certificate], address: &Address) -> Vec<Certificate> {
        records
            .iter()
            .filter(|record| record.is_held_by(address))
            .cloned()
            .collect()
    }

    /// Free-text stage; `query` must already be trimmed and lowercased
    #[must_use]
    pub fn by_text(records: &[Certificate], query: &str) -> Vec<Certificate> {
        records
            .iter()
            .filter(|record| Self::text_matches(record, query))
            .cloned()
            .collect()
    }

    fn text_matches(record: &Certificate, query: &str) -> bool {
        // Addresses are stored lowercase, so the canonical form covers mixed-case input
        [
            record.recipient_name.to_lowercase(),
            record.certificate_type.to_lowercase(),
            record.institution_name.to_lowercase(),
            record.id.as_str().to_lowercase(),
            record.recipient_address.to_hex(),
        ]
        .iter()
        .any(|field| field.contains(query))
    }
}
