//! Errors surfaced by ledger and storage collaborators.

use certum_core::CoreError;

/// Result type for collaborator calls
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Collaborator errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Provider or wallet returned an RPC error
    #[error("RPC error{}: {message}", code_suffix(.code))]
    Rpc {
        /// Provider error code, if any
        code: Option<i64>,
        /// Provider error message
        message: String,
    },

    /// Contract call reverted
    #[error("execution reverted: {reason}")]
    Reverted {
        /// Revert reason
        reason: String,
    },

    /// Provider unreachable
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Underlying message
        message: String,
    },

    /// Decentralized storage failed
    #[error("storage error: {message}")]
    Storage {
        /// Underlying message
        message: String,
    },

    /// Response could not be decoded into a domain type
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LedgerError {
    /// Raw failure signal for classification
    #[must_use]
    pub fn signal(&self) -> FailureSignal {
        match self {
            Self::Rpc { code, message } => FailureSignal {
                code: *code,
                message: message.clone(),
            },
            other => FailureSignal {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        Self::Malformed(err.to_string())
    }
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" {c}")).unwrap_or_default()
}

/// Raw failure signal: an optional numeric code plus message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSignal {
    /// Numeric code (wallet/provider convention)
    pub code: Option<i64>,
    /// Message text
    pub message: String,
}

impl FailureSignal {
    /// Signal with message text only
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Signal with a code and message text
    #[must_use]
    pub fn coded(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_display_with_code() {
        let err = LedgerError::Rpc {
            code: Some(4001),
            message: "User rejected the request".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error 4001: User rejected the request");
    }

    #[test]
    fn test_rpc_display_without_code() {
        let err = LedgerError::Rpc {
            code: None,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error: boom");
    }

    #[test]
    fn test_signal_keeps_code() {
        let err = LedgerError::Rpc {
            code: Some(4001),
            message: "denied".to_string(),
        };
        assert_eq!(err.signal(), FailureSignal::coded(4001, "denied"));
    }

    #[test]
    fn test_signal_from_revert() {
        let err = LedgerError::Reverted {
            reason: "Organization not registered".to_string(),
        };
        let signal = err.signal();
        assert!(signal.code.is_none());
        assert!(signal.message.contains("Organization not registered"));
    }
}
