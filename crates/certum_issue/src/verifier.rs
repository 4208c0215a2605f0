//! Point-lookup verification of a single certificate.

use certum_core::{Certificate, CertificateId};
use certum_ledger::{LedgerReader, LedgerResult};
use std::sync::Arc;

/// Verification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The ledger holds a live record under the id
    Verified {
        /// Record as stored on the ledger
        certificate: Certificate,
    },
    /// No live record under the id in either contract
    NotFound,
}

/// Looks a certificate up directly on the ledger
pub struct CertificateVerifier<R: LedgerReader + ?Sized> {
    reader: Arc<R>,
}

impl<R: LedgerReader + ?Sized> CertificateVerifier<R> {
    /// Create a verifier
    #[must_use]
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Try the standard contract, then the NFT contract
    ///
    /// # Errors
    ///
    /// Returns error if a lookup fails
    pub async fn verify(&self, id: &CertificateId) -> LedgerResult<Verification> {
        for is_nft in [false, true] {
            if let Some(record) = self.reader.certificate(id, is_nft).await? {
                if record.is_burned() {
                    continue;
                }
                let mut certificate = record;
                certificate.is_nft = is_nft;
                return Ok(Verification::Verified { certificate });
            }
        }
        Ok(Verification::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certum_core::Address;
    use certum_sim::{FailurePlan, SimFixture, SimLedger};
    use chrono::NaiveDate;

    fn cert(id: &str, recipient: Address) -> Certificate {
        Certificate::new(
            CertificateId::new(id),
            "Ada",
            recipient,
            "Degree",
            "Uni",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    fn verifier(fixture: SimFixture) -> CertificateVerifier<SimLedger> {
        CertificateVerifier::new(Arc::new(SimLedger::new(fixture)))
    }

    #[tokio::test]
    async fn test_verify_standard_and_nft() {
        let live = Address::from_bytes([1; 20]);
        let fixture = SimFixture::new(1)
            .with_standard(cert("1", live), 5)
            .with_nft(cert("2", live), 6);
        let verifier = verifier(fixture);

        match verifier.verify(&CertificateId::new("1")).await.unwrap() {
            Verification::Verified { certificate } => assert!(!certificate.is_nft),
            Verification::NotFound => panic!("standard record missing"),
        }
        match verifier.verify(&CertificateId::new("2")).await.unwrap() {
            Verification::Verified { certificate } => assert!(certificate.is_nft),
            Verification::NotFound => panic!("nft record missing"),
        }
        assert_eq!(
            verifier.verify(&CertificateId::new("3")).await.unwrap(),
            Verification::NotFound
        );
    }

    #[tokio::test]
    async fn test_burned_reports_not_found() {
        let fixture = SimFixture::new(1).with_standard(cert("1", Address::ZERO), 5);
        assert_eq!(
            verifier(fixture).verify(&CertificateId::new("1")).await.unwrap(),
            Verification::NotFound
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let ledger = SimLedger::new(SimFixture::new(1))
            .with_failures(FailurePlan::new().with_failing_lookup(CertificateId::new("1"), false));
        let verifier = CertificateVerifier::new(Arc::new(ledger));
        assert!(verifier.verify(&CertificateId::new("1")).await.is_err());
    }
}
