//! CERTUM Issuance
//!
//! Everything between a filled-in issuance form and a certificate in the
//! cached set: precondition checks, the explicit issuance state machine,
//! the submitter that drives it against the ledger, and the classifier
//! that turns raw failures into user-facing categories.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod document;
pub mod error;
pub mod form;
pub mod machine;
pub mod registration;
pub mod submitter;
pub mod validator;
pub mod verifier;

pub use classifier::{ClassifierRule, ErrorCategory, ErrorClassifier, RulePattern};
pub use document::DocumentUploader;
pub use error::{DocumentError, PreconditionError, RegistrationError, SubmitError};
pub use form::{DocumentState, IssuanceDraft, IssuanceForm, IssuerContext, ValidIssuance};
pub use machine::{
    IssuanceEvent, IssuanceMachine, IssuanceState, Notice, NoticeLevel, Transition,
    TransitionError,
};
pub use registration::{OrganizationRegistrar, RegistrationReceipt};
pub use submitter::{IssuanceOutcome, IssuanceSubmitter};
pub use validator::{PreconditionValidator, ValidationCheck, ValidationReport};
pub use verifier::{CertificateVerifier, Verification};
