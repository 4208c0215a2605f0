//! Explicit issuance state machine.
//!
//! ```text
//! Idle -> Validating -> UploadingMetadata -> Submitting -> Succeeded
//!                  \________________________/       \--> Failed
//! ```
//!
//! Standard issuance skips `UploadingMetadata`. Every non-terminal state
//! can fail; terminal states accept a new `Submit` or a `Reset`.

use crate::classifier::ErrorCategory;
use crate::error::PreconditionError;
use certum_core::CertificateId;
use std::fmt;

/// Issuance state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceState {
    /// Nothing in flight
    Idle,
    /// Network identity, form preconditions, and issuer role being checked
    Validating,
    /// NFT metadata being uploaded
    UploadingMetadata,
    /// Ledger mutation awaiting its receipt
    Submitting,
    /// Ledger returned an identifier
    Succeeded {
        /// New certificate id
        certificate_id: CertificateId,
    },
    /// Issuance stopped
    Failed {
        /// Why
        category: ErrorCategory,
    },
}

impl IssuanceState {
    /// Whether the state ends a submission
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Whether a submission is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::UploadingMetadata | Self::Submitting
        )
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::UploadingMetadata => "uploading-metadata",
            Self::Submitting => "submitting",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for IssuanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { certificate_id } => write!(f, "succeeded({})", certificate_id),
            Self::Failed { category } => write!(f, "failed({})", category.name()),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Input driving the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceEvent {
    /// User pressed submit
    Submit,
    /// Every check passed
    ChecksPassed {
        /// Issue through the NFT contract
        is_nft: bool,
    },
    /// A precondition failed
    ChecksFailed(PreconditionError),
    /// NFT metadata is stored
    MetadataUploaded,
    /// Ledger returned a receipt
    Confirmed {
        /// Identifier from the receipt
        certificate_id: CertificateId,
    },
    /// A collaborator call failed
    Faulted(ErrorCategory),
    /// Return to idle
    Reset,
}

impl IssuanceEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::ChecksPassed { .. } => "checks-passed",
            Self::ChecksFailed(_) => "checks-failed",
            Self::MetadataUploaded => "metadata-uploaded",
            Self::Confirmed { .. } => "confirmed",
            Self::Faulted(_) => "faulted",
            Self::Reset => "reset",
        }
    }
}

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Progress
    Info,
    /// Issuance finished
    Success,
    /// Issuance failed
    Error,
}

/// Transient user-facing message emitted by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the step
    pub next: IssuanceState,
    /// Message to surface, if any
    pub notice: Option<Notice>,
}

impl Transition {
    fn to(next: IssuanceState) -> Self {
        Self { next, notice: None }
    }

    fn with_notice(next: IssuanceState, notice: Notice) -> Self {
        Self {
            next,
            notice: Some(notice),
        }
    }

    fn failed(category: ErrorCategory) -> Self {
        let notice = Notice::error(category.user_message());
        Self::with_notice(IssuanceState::Failed { category }, notice)
    }
}

/// Transition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Event not accepted in the current state
    #[error("illegal transition: {event} in state {state}")]
    Illegal {
        /// Current state name
        state: &'static str,
        /// Rejected event name
        event: &'static str,
    },
}

/// Pure transition function
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuanceMachine;

impl IssuanceMachine {
    /// Create the machine
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Next state for `event` in `state`
    ///
    /// # Errors
    ///
    /// Returns error if `state` does not accept `event`
    pub fn transition(
        &self,
        state: &IssuanceState,
        event: IssuanceEvent,
    ) -> Result<Transition, TransitionError> {
        use IssuanceEvent as E;
        use IssuanceState as S;

        let transition = match (state, event) {
            (S::Idle | S::Succeeded { .. } | S::Failed { .. }, E::Submit) => {
                Transition::with_notice(S::Validating, Notice::info("Checking issuance requirements"))
            }
            (S::Idle | S::Succeeded { .. } | S::Failed { .. }, E::Reset) => Transition::to(S::Idle),

            (S::Validating, E::ChecksPassed { is_nft: true }) => Transition::with_notice(
                S::UploadingMetadata,
                Notice::info("Uploading certificate metadata"),
            ),
            (S::Validating, E::ChecksPassed { is_nft: false }) => {
                Transition::with_notice(S::Submitting, Notice::info("Submitting transaction"))
            }
            (S::Validating, E::ChecksFailed(reason)) => {
                let notice = Notice::error(reason.to_string());
                Transition::with_notice(
                    S::Failed {
                        category: reason.category(),
                    },
                    notice,
                )
            }

            (S::UploadingMetadata, E::MetadataUploaded) => {
                Transition::with_notice(S::Submitting, Notice::info("Submitting transaction"))
            }

            (S::Submitting, E::Confirmed { certificate_id }) => {
                if certificate_id.is_empty() {
                    Transition::failed(ErrorCategory::ContractCallFailed)
                } else {
                    let notice = Notice::success(format!("Certificate {} issued", certificate_id));
                    Transition::with_notice(S::Succeeded { certificate_id }, notice)
                }
            }

            (S::Validating | S::UploadingMetadata | S::Submitting, E::Faulted(category)) => {
                Transition::failed(category)
            }

            (state, event) => {
                return Err(TransitionError::Illegal {
                    state: state.name(),
                    event: event.name(),
                });
            }
        };
        Ok(transition)
    }
}
