//! Failure classification.
//!
//! Rules are tried in order and the first match wins, so specific phrases
//! such as "insufficient funds" must come before generic ones such as
//! "network" or "revert".

use certum_ledger::{FailureSignal, LedgerError};
use std::fmt;

/// User-facing failure category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Signer declined the request
    UserRejected,
    /// Account cannot pay for the transaction
    InsufficientFunds,
    /// Wallet or provider is on another network
    WrongNetwork,
    /// Caller lacks the issuer capability
    Unauthorized,
    /// Organization has not registered
    NotRegistered,
    /// Contract call reverted or failed
    ContractCallFailed,
    /// Nothing matched; carries the original message verbatim
    Unknown(String),
}

impl ErrorCategory {
    /// Short stable name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserRejected => "user-rejected",
            Self::InsufficientFunds => "insufficient-funds",
            Self::WrongNetwork => "wrong-network",
            Self::Unauthorized => "unauthorized",
            Self::NotRegistered => "not-registered",
            Self::ContractCallFailed => "contract-call-failed",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Copy shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UserRejected => "Transaction was rejected in the wallet.".to_string(),
            Self::InsufficientFunds => {
                "Insufficient funds to pay for the transaction.".to_string()
            }
            Self::WrongNetwork => "Switch your wallet to the required network.".to_string(),
            Self::Unauthorized => {
                "This account is not authorized to issue certificates.".to_string()
            }
            Self::NotRegistered => {
                "Register your organization before issuing NFT certificates.".to_string()
            }
            Self::ContractCallFailed => {
                "The contract call failed. Check the details and try again.".to_string()
            }
            Self::Unknown(message) => format!("Unexpected error: {}", message),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(message) => write!(f, "unknown: {}", message),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// What a rule looks for in a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePattern {
    /// Exact numeric code
    Code(i64),
    /// Case-insensitive substring of the message
    Substring(&'static str),
}

impl RulePattern {
    fn matches(self, code: Option<i64>, lowered: &str) -> bool {
        match self {
            Self::Code(expected) => code == Some(expected),
            Self::Substring(needle) => lowered.contains(needle),
        }
    }
}

/// One classification rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRule {
    /// Pattern to test
    pub pattern: RulePattern,
    /// Category assigned on match
    pub category: ErrorCategory,
}

impl ClassifierRule {
    /// Match a numeric code
    #[must_use]
    pub fn code(code: i64, category: ErrorCategory) -> Self {
        Self {
            pattern: RulePattern::Code(code),
            category,
        }
    }

    /// Match a lowercase substring
    #[must_use]
    pub fn substring(needle: &'static str, category: ErrorCategory) -> Self {
        Self {
            pattern: RulePattern::Substring(needle),
            category,
        }
    }
}

/// Ordered rule list mapping raw failures to categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassifier {
    rules: Vec<ClassifierRule>,
}

impl ErrorClassifier {
    /// Classifier with the default rule order
    #[must_use]
    pub fn new() -> Self {
        use ErrorCategory::*;
        Self::with_rules(vec![
            ClassifierRule::code(4001, UserRejected),
            ClassifierRule::substring("user rejected", UserRejected),
            ClassifierRule::substring("user denied", UserRejected),
            ClassifierRule::substring("action_rejected", UserRejected),
            ClassifierRule::substring("insufficient funds", InsufficientFunds),
            ClassifierRule::substring("wrong network", WrongNetwork),
            ClassifierRule::substring("network", WrongNetwork),
            ClassifierRule::substring("chain id", WrongNetwork),
            ClassifierRule::substring("chainid", WrongNetwork),
            ClassifierRule::substring("unauthorized", Unauthorized),
            ClassifierRule::substring("not authorized", Unauthorized),
            ClassifierRule::substring("accesscontrol", Unauthorized),
            ClassifierRule::substring("missing role", Unauthorized),
            ClassifierRule::substring("not registered", NotRegistered),
            ClassifierRule::substring("execution reverted", ContractCallFailed),
            ClassifierRule::substring("call exception", ContractCallFailed),
            ClassifierRule::substring("revert", ContractCallFailed),
        ])
    }

    /// Classifier with a custom rule order
    #[must_use]
    pub fn with_rules(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order
    #[must_use]
    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    /// Classify a raw signal
    #[must_use]
    pub fn classify(&self, signal: &FailureSignal) -> ErrorCategory {
        let lowered = signal.message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(signal.code, &lowered))
            .map_or_else(
                || ErrorCategory::Unknown(signal.message.clone()),
                |rule| rule.category.clone(),
            )
    }

    /// Classify a collaborator error
    #[must_use]
    pub fn classify_error(&self, err: &LedgerError) -> ErrorCategory {
        let category = self.classify(&err.signal());
        tracing::debug!(error = %err, %category, "classified failure");
        category
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
