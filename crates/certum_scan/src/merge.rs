//! Collapse raw scan output into one record per certificate id.

use certum_core::{Certificate, CertificateId};
use indexmap::IndexMap;

/// Merge raw records, last write wins per id
///
/// Input order is scan order: the standard stream before the NFT stream,
/// each in ascending block order. A later record replaces an earlier one
/// with the same id wholesale. Records held by the sentinel address are
/// dropped. The result is sorted by [`sort_certificates`], so feeding the
/// output back in yields the same output.
#[must_use]
pub fn merge_certificates<I>(records: I) -> Vec<Certificate>
where
    I: IntoIterator<Item = Certificate>,
{
    let mut by_id: IndexMap<CertificateId, Certificate> = IndexMap::new();
    for record in records {
        if record.is_burned() {
            continue;
        }
        by_id.insert(record.id.clone(), record);
    }

    let mut merged: Vec<Certificate> = by_id.into_values().collect();
    sort_certificates(&mut merged);
    merged
}

/// Most recent issue date first; equal dates ordered by id ascending
pub fn sort_certificates(records: &mut [Certificate]) {
    records.sort_by(|a, b| {
        b.issue_date
            .cmp(&a.issue_date)
            .then_with(|| a.id.cmp(&b.id))
    });
}
