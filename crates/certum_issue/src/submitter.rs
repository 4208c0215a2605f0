//! Issuance orchestration.

use crate::classifier::{ErrorCategory, ErrorClassifier};
use crate::error::{PreconditionError, SubmitError};
use crate::form::{IssuanceDraft, IssuerContext, ValidIssuance};
use crate::machine::{IssuanceEvent, IssuanceMachine, IssuanceState, Notice};
use crate::validator::PreconditionValidator;
use certum_core::date::DATE_FORMAT;
use certum_core::{Address, Certificate};
use certum_ledger::{
    IssueRequest, LedgerReader, LedgerWriter, MetadataInput, MintRequest, StorageClient,
    Submission, WalletSession,
};
use certum_store::{CertificateMirror, CertificateRepository};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything one submission went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceOutcome {
    /// States visited, starting with the one before `Submit`
    pub trace: Vec<IssuanceState>,
    /// Final state
    pub state: IssuanceState,
    /// Record added to the cached set on success
    pub certificate: Option<Certificate>,
    /// Notices emitted along the way
    pub notices: Vec<Notice>,
}

impl IssuanceOutcome {
    /// Whether the ledger accepted the issuance
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.state, IssuanceState::Succeeded { .. })
    }

    /// Failure category, if the submission failed
    #[must_use]
    pub fn failure(&self) -> Option<&ErrorCategory> {
        match &self.state {
            IssuanceState::Failed { category } => Some(category),
            _ => None,
        }
    }
}

/// One submission walking the machine
struct Run {
    machine: IssuanceMachine,
    state: IssuanceState,
    trace: Vec<IssuanceState>,
    notices: Vec<Notice>,
}

impl Run {
    fn new(machine: IssuanceMachine, start: IssuanceState) -> Self {
        Self {
            machine,
            trace: vec![start.clone()],
            state: start,
            notices: Vec::new(),
        }
    }

    fn step(&mut self, event: IssuanceEvent) -> Result<(), SubmitError> {
        let transition = self.machine.transition(&self.state, event)?;
        tracing::debug!(from = %self.state, to = %transition.next, "issuance transition");
        if let Some(notice) = transition.notice {
            self.notices.push(notice);
        }
        self.state = transition.next;
        self.trace.push(self.state.clone());
        Ok(())
    }

    fn finish(self, certificate: Option<Certificate>) -> IssuanceOutcome {
        IssuanceOutcome {
            trace: self.trace,
            state: self.state,
            certificate,
            notices: self.notices,
        }
    }
}

/// Clears the issuing flag when a submission ends, however it ends
struct IssuingGuard<'a>(&'a AtomicBool);

impl Drop for IssuingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives issuance against the ledger, storage, and the cached set
pub struct IssuanceSubmitter<L: ?Sized, S: ?Sized> {
    ledger: Arc<L>,
    storage: Arc<S>,
    repository: Arc<CertificateRepository>,
    mirror: Arc<dyn CertificateMirror>,
    validator: PreconditionValidator,
    classifier: ErrorClassifier,
    machine: IssuanceMachine,
    required_chain_id: u64,
    issuing: AtomicBool,
}

impl<L, S> IssuanceSubmitter<L, S>
where
    L: LedgerReader + LedgerWriter + ?Sized,
    S: StorageClient + ?Sized,
{
    /// Create a submitter for `required_chain_id`
    #[must_use]
    pub fn new(
        ledger: Arc<L>,
        storage: Arc<S>,
        repository: Arc<CertificateRepository>,
        mirror: Arc<dyn CertificateMirror>,
        required_chain_id: u64,
    ) -> Self {
        Self {
            ledger,
            storage,
            repository,
            mirror,
            validator: PreconditionValidator::new(),
            classifier: ErrorClassifier::new(),
            machine: IssuanceMachine::new(),
            required_chain_id,
            issuing: AtomicBool::new(false),
        }
    }

    /// Replace the failure classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Whether a submission is in flight
    #[must_use]
    pub fn is_issuing(&self) -> bool {
        self.issuing.load(Ordering::Acquire)
    }

    /// Run one issuance for `draft`
    ///
    /// Failures of the issuance itself end in [`IssuanceState::Failed`]
    /// and are reported through the outcome. On success the draft is reset.
    ///
    /// # Errors
    ///
    /// Returns error if another submission is in flight
    pub async fn submit(
        &self,
        draft: &mut IssuanceDraft,
        wallet: &WalletSession,
    ) -> Result<IssuanceOutcome, SubmitError> {
        if self
            .issuing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("submit ignored; issuance already in flight");
            return Err(SubmitError::AlreadyIssuing);
        }
        let _guard = IssuingGuard(&self.issuing);

        let mut run = Run::new(self.machine, IssuanceState::Idle);
        run.step(IssuanceEvent::Submit)?;

        let (issuer, valid) = match self.validate(draft, wallet).await {
            Ok(checked) => checked,
            Err(event) => {
                run.step(event)?;
                return Ok(run.finish(None));
            }
        };
        run.step(IssuanceEvent::ChecksPassed {
            is_nft: valid.is_nft,
        })?;

        let submission = if valid.is_nft {
            let metadata_url = match self.upload_metadata(&valid).await {
                Ok(url) => url,
                Err(category) => {
                    run.step(IssuanceEvent::Faulted(category))?;
                    return Ok(run.finish(None));
                }
            };
            run.step(IssuanceEvent::MetadataUploaded)?;
            self.mint(issuer, &valid, metadata_url).await
        } else {
            self.issue(issuer, &valid).await
        };

        let submission = match submission {
            Ok(submission) => submission,
            Err(category) => {
                run.step(IssuanceEvent::Faulted(category))?;
                return Ok(run.finish(None));
            }
        };

        let Some(certificate_id) = submission.certificate_id.filter(|id| !id.is_empty()) else {
            tracing::warn!(tx = %submission.transaction_hash, "receipt carried no certificate id");
            run.step(IssuanceEvent::Faulted(ErrorCategory::ContractCallFailed))?;
            return Ok(run.finish(None));
        };
        run.step(IssuanceEvent::Confirmed {
            certificate_id: certificate_id.clone(),
        })?;

        let certificate = valid.into_certificate(certificate_id, submission.transaction_hash);
        self.repository.upsert_one(certificate.clone()).await;
        if let Err(err) = self.repository.persist(self.mirror.as_ref()).await {
            tracing::warn!(error = %err, "issued certificate not persisted to mirror");
        }
        draft.reset();

        tracing::info!(
            id = %certificate.id,
            nft = certificate.is_nft,
            tx = %submission.transaction_hash,
            "certificate issued"
        );
        Ok(run.finish(Some(certificate)))
    }

    /// Validating stage; `Err` holds the event that ends the submission
    async fn validate(
        &self,
        draft: &IssuanceDraft,
        wallet: &WalletSession,
    ) -> Result<(Address, ValidIssuance), IssuanceEvent> {
        let Some(issuer) = wallet.address else {
            return Err(IssuanceEvent::ChecksFailed(
                PreconditionError::WalletNotConnected,
            ));
        };
        if !wallet.network_matches(self.required_chain_id) {
            return Err(IssuanceEvent::ChecksFailed(PreconditionError::WrongNetwork {
                expected: self.required_chain_id,
                actual: wallet.chain_id,
            }));
        }

        let context = if draft.form.is_nft {
            match self.ledger.organization(&issuer).await {
                Ok(organization) => IssuerContext { organization },
                Err(err) => {
                    return Err(IssuanceEvent::Faulted(self.classifier.classify_error(&err)));
                }
            }
        } else {
            IssuerContext::default()
        };

        let valid = self
            .validator
            .check(&draft.form, &draft.document, &context)
            .map_err(IssuanceEvent::ChecksFailed)?;

        if !valid.is_nft {
            match self.ledger.has_issuer_role(&issuer).await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(IssuanceEvent::ChecksFailed(
                        PreconditionError::MissingIssuerRole,
                    ));
                }
                Err(err) => {
                    return Err(IssuanceEvent::Faulted(self.classifier.classify_error(&err)));
                }
            }
        }
        Ok((issuer, valid))
    }

    async fn upload_metadata(&self, valid: &ValidIssuance) -> Result<String, ErrorCategory> {
        let organization = valid.organization.as_ref();
        let input = MetadataInput {
            recipient_name: valid.recipient_name.clone(),
            certificate_type: valid.certificate_type.clone(),
            institution_name: valid.institution_name.clone(),
            issue_date: valid.issue_date.format(DATE_FORMAT).to_string(),
            expiration_date: valid
                .expiration_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            additional_details: valid.additional_details.clone(),
            document_hash: valid.document_hash.clone(),
            logo_url: organization.and_then(|org| org.logo_url.clone()),
            brand_color: organization.and_then(|org| org.brand_color.clone()),
        };
        let metadata = self.storage.generate_metadata(&input);
        let hash = self
            .storage
            .upload_json(metadata)
            .await
            .map_err(|err| self.classifier.classify_error(&err))?;
        let url = self.storage.gateway_url(&hash);
        tracing::debug!(%url, "metadata uploaded");
        Ok(url)
    }

    async fn mint(
        &self,
        issuer: Address,
        valid: &ValidIssuance,
        metadata_url: String,
    ) -> Result<Submission, ErrorCategory> {
        let request = MintRequest {
            issuer,
            recipient_address: valid.recipient_address,
            recipient_name: valid.recipient_name.clone(),
            certificate_type: valid.certificate_type.clone(),
            institution_name: valid.institution_name.clone(),
            issue_date: valid.issue_date.format(DATE_FORMAT).to_string(),
            expiration_date: valid
                .expiration_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            metadata_url,
        };
        self.ledger
            .mint_certificate(request)
            .await
            .map_err(|err| self.classifier.classify_error(&err))
    }

    async fn issue(&self, issuer: Address, valid: &ValidIssuance) -> Result<Submission, ErrorCategory> {
        let request = IssueRequest {
            issuer,
            recipient_name: valid.recipient_name.clone(),
            recipient_address: valid.recipient_address,
            certificate_type: valid.certificate_type.clone(),
            institution_name: valid.institution_name.clone(),
            issue_date: valid.issue_date.format(DATE_FORMAT).to_string(),
            expiration_date: valid
                .expiration_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            additional_details: valid.additional_details.clone(),
            document_hash: valid.document_hash.clone(),
        };
        self.ledger
            .issue_certificate(request)
            .await
            .map_err(|err| self.classifier.classify_error(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::IssuanceForm;
    use certum_ledger::{LedgerError, Organization};
    use certum_sim::{FailurePlan, SimFixture, SimLedger, SimStorage};
    use certum_store::MemoryMirror;

    const CHAIN: u64 = 11_155_111;

    fn issuer() -> Address {
        Address::from_bytes([0xaa; 20])
    }

    fn wallet() -> WalletSession {
        WalletSession::connected(issuer(), CHAIN)
    }

    fn form(is_nft: bool) -> IssuanceForm {
        IssuanceForm {
            recipient_name: "Ada Lovelace".to_string(),
            recipient_address: "0x1111111111111111111111111111111111111111".to_string(),
            certificate_type: "Engineering".to_string(),
            issue_date: "2025-01-01".to_string(),
            expiration_date: "2025-01-02".to_string(),
            institution_name: "Analytical Society".to_string(),
            additional_details: "first program".to_string(),
            is_nft,
        }
    }

    struct Harness {
        ledger: Arc<SimLedger>,
        storage: Arc<SimStorage>,
        repository: Arc<CertificateRepository>,
        mirror: Arc<MemoryMirror>,
        submitter: IssuanceSubmitter<SimLedger, SimStorage>,
    }

    fn harness(fixture: SimFixture, plan: FailurePlan) -> Harness {
        let ledger = Arc::new(SimLedger::new(fixture).with_failures(plan));
        let storage = Arc::new(SimStorage::new());
        let repository = Arc::new(CertificateRepository::new());
        let mirror = Arc::new(MemoryMirror::new());
        let submitter = IssuanceSubmitter::new(
            ledger.clone(),
            storage.clone(),
            repository.clone(),
            mirror.clone(),
            CHAIN,
        );
        Harness {
            ledger,
            storage,
            repository,
            mirror,
            submitter,
        }
    }

    fn with_issuer() -> SimFixture {
        SimFixture::new(CHAIN).with_head(100).with_issuer(issuer())
    }

    fn with_org() -> SimFixture {
        SimFixture::new(CHAIN).with_head(100).with_organization(
            issuer(),
            Organization::registered("Analytical Society", "https://gateway.sim/ipfs/logo", "#112233"),
        )
    }

    #[tokio::test]
    async fn test_standard_issuance_succeeds() {
        let h = harness(with_issuer(), FailurePlan::new());
        let mut draft = IssuanceDraft::new(form(false));

        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(
            outcome.trace,
            vec![
                IssuanceState::Idle,
                IssuanceState::Validating,
                IssuanceState::Submitting,
                outcome.state.clone(),
            ]
        );

        let issued = outcome.certificate.unwrap();
        assert_eq!(h.repository.snapshot().await, vec![issued.clone()]);
        assert_eq!(h.mirror.load().unwrap(), vec![issued.clone()]);
        assert!(!issued.is_nft);
        assert!(issued.transaction_hash.is_some());
        assert_eq!(draft, IssuanceDraft::default());
        assert_eq!(h.storage.upload_count().await, 0);
        assert!(!h.submitter.is_issuing());
    }

    #[tokio::test]
    async fn test_nft_issuance_uploads_metadata() {
        let h = harness(with_org(), FailurePlan::new());
        let mut draft = IssuanceDraft::new(form(true));
        draft
            .document
            .finish_upload("b3doc".to_string(), "https://gateway.sim/ipfs/b3doc".to_string());

        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.trace.len(), 5);
        assert_eq!(outcome.trace[2], IssuanceState::UploadingMetadata);

        let issued = outcome.certificate.unwrap();
        assert!(issued.is_nft);
        assert_eq!(issued.owner, Some(issued.recipient_address));
        assert_eq!(issued.document_hash.as_deref(), Some("b3doc"));
        assert_eq!(h.storage.upload_count().await, 1);
        assert_eq!(h.ledger.write_count().await, 1);
    }

    #[tokio::test]
    async fn test_bad_expiration_fails_without_mutation() {
        let h = harness(with_issuer(), FailurePlan::new());
        let mut draft = IssuanceDraft::new(IssuanceForm {
            expiration_date: "2025-01-01".to_string(),
            ..form(false)
        });

        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert_eq!(
            outcome.trace,
            vec![
                IssuanceState::Idle,
                IssuanceState::Validating,
                outcome.state.clone()
            ]
        );
        assert!(matches!(outcome.failure(), Some(ErrorCategory::Unknown(_))));
        assert_eq!(h.ledger.write_count().await, 0);
        assert_eq!(draft.form.expiration_date, "2025-01-01");
    }

    #[tokio::test]
    async fn test_wrong_network_fails() {
        let h = harness(with_issuer(), FailurePlan::new());
        let mut draft = IssuanceDraft::new(form(false));
        let outcome = h
            .submitter
            .submit(&mut draft, &WalletSession::connected(issuer(), 1))
            .await
            .unwrap();
        assert_eq!(outcome.failure(), Some(&ErrorCategory::WrongNetwork));
        assert_eq!(h.ledger.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnected_wallet_fails() {
        let h = harness(with_issuer(), FailurePlan::new());
        let mut draft = IssuanceDraft::new(form(false));
        let outcome = h
            .submitter
            .submit(&mut draft, &WalletSession::disconnected())
            .await
            .unwrap();
        assert!(outcome.failure().is_some());
        assert_eq!(outcome.trace.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_role_is_unauthorized() {
        let h = harness(SimFixture::new(CHAIN), FailurePlan::new());
        let mut draft = IssuanceDraft::new(form(false));
        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert_eq!(outcome.failure(), Some(&ErrorCategory::Unauthorized));
        assert_eq!(h.ledger.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_unregistered_org_blocks_nft() {
        let h = harness(with_issuer(), FailurePlan::new());
        let mut draft = IssuanceDraft::new(form(true));
        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert_eq!(outcome.failure(), Some(&ErrorCategory::NotRegistered));
        assert_eq!(h.storage.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_user_rejection_classified() {
        let plan = FailurePlan::new().with_write_failure(LedgerError::Rpc {
            code: Some(4001),
            message: "User rejected the request.".to_string(),
        });
        let h = harness(with_issuer(), plan);
        let mut draft = IssuanceDraft::new(form(false));

        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert_eq!(outcome.failure(), Some(&ErrorCategory::UserRejected));
        assert_eq!(
            outcome.notices.last().unwrap().message,
            ErrorCategory::UserRejected.user_message()
        );
        assert!(h.repository.is_empty().await);
        assert_eq!(draft.form, form(false));
    }

    #[tokio::test]
    async fn test_missing_id_fails_contract_call() {
        let h = harness(with_issuer(), FailurePlan::new().with_write_without_id());
        let mut draft = IssuanceDraft::new(form(false));
        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert_eq!(outcome.failure(), Some(&ErrorCategory::ContractCallFailed));
        assert!(h.repository.is_empty().await);
        assert!(h.mirror.raw().is_none());
    }

    #[tokio::test]
    async fn test_role_query_fault_classified() {
        let h = harness(with_issuer(), FailurePlan::new().with_role_query_failure());
        let mut draft = IssuanceDraft::new(form(false));
        let outcome = h.submitter.submit(&mut draft, &wallet()).await.unwrap();
        assert_eq!(outcome.failure(), Some(&ErrorCategory::ContractCallFailed));
    }

    #[tokio::test]
    async fn test_concurrent_submit_rejected() {
        let h = harness(with_issuer(), FailurePlan::new());
        h.submitter.issuing.store(true, Ordering::Release);

        let mut draft = IssuanceDraft::new(form(false));
        let result = h.submitter.submit(&mut draft, &wallet()).await;
        assert_eq!(result, Err(SubmitError::AlreadyIssuing));
        assert_eq!(h.ledger.write_count().await, 0);
        assert_eq!(draft.form, form(false));
    }

    #[tokio::test]
    async fn test_second_submission_after_success() {
        let h = harness(with_issuer(), FailurePlan::new());
        let mut first = IssuanceDraft::new(form(false));
        let mut second = IssuanceDraft::new(IssuanceForm {
            recipient_name: "Charles Babbage".to_string(),
            ..form(false)
        });
        assert!(h.submitter.submit(&mut first, &wallet()).await.unwrap().is_success());
        assert!(h.submitter.submit(&mut second, &wallet()).await.unwrap().is_success());
        assert_eq!(h.repository.len().await, 2);
        assert_eq!(h.mirror.load().unwrap().len(), 2);
    }
}
