//! Mirror errors.

use certum_core::CoreError;

/// Result type for mirror operations
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Persisted mirror errors
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Underlying database failed
    #[error("mirror database error: {0}")]
    Database(#[from] redb::Error),

    /// Stored list could not be encoded or decoded
    #[error("mirror encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

macro_rules! from_redb {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for MirrorError {
                fn from(err: $err) -> Self {
                    Self::Database(redb::Error::from(err))
                }
            }
        )*
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

impl From<MirrorError> for CoreError {
    fn from(err: MirrorError) -> Self {
        CoreError::Internal {
            message: err.to_string(),
        }
    }
}
