//! Core error types for CERTUM.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Address does not match the ledger's address syntax
    InvalidAddress { input: String },

    /// Transaction hash is malformed
    InvalidHash { reason: String },

    /// Calendar date could not be parsed
    InvalidDate { input: String },

    /// Invalid ID format
    InvalidId { reason: String },

    /// Validation error
    Validation { field: String, reason: String },

    /// Encoding or decoding failed
    Encoding { reason: String },

    /// Internal error (for unexpected errors)
    Internal {
        /// Error message
        message: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress { input } => write!(f, "Invalid address: {}", input),
            Self::InvalidHash { reason } => write!(f, "Invalid hash: {}", reason),
            Self::InvalidDate { input } => write!(f, "Invalid date: {}", input),
            Self::InvalidId { reason } => write!(f, "Invalid ID: {}", reason),
            Self::Validation { field, reason } => {
                write!(f, "Validation failed for {}: {}", field, reason)
            }
            Self::Encoding { reason } => write!(f, "Encoding error: {}", reason),
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidAddress {
            input: "0x12".to_string(),
        };
        assert_eq!(format!("{}", err), "Invalid address: 0x12");

        let err = CoreError::InvalidDate {
            input: "2025-02-30".to_string(),
        };
        assert_eq!(format!("{}", err), "Invalid date: 2025-02-30");
    }

    #[test]
    fn test_validation_error_display() {
        let err = CoreError::Validation {
            field: "recipient_name".to_string(),
            reason: "too long".to_string(),
        };
        let s = format!("{}", err);
        assert!(s.contains("recipient_name"));
        assert!(s.contains("too long"));
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Encoding { .. }));
    }
}
