use jiff::Timestamp;
use scrip_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MintError>;

/// Rejections produced by request validation, first failure wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("code name must be between 1 and 20 characters, got {0}")]
    InvalidName(usize),
    #[error("code count must be greater than 0, got {0}")]
    InvalidCount(i64),
    #[error("a single batch cannot exceed 100 codes, got {0}")]
    CountTooLarge(i64),
    #[error("random quota bounds must both be greater than 0, got {min} and {max}")]
    InvalidRandomBounds { min: i64, max: i64 },
    #[error("minimum quota {min} must be less than maximum quota {max}")]
    MinNotLessThanMax { min: i64, max: i64 },
    #[error("fixed quota must be greater than 0, got {0}")]
    InvalidQuota(i64),
    #[error("expiration {expires_at} is earlier than the current time {now}")]
    ExpiredInPast { expires_at: Timestamp, now: Timestamp },
}

#[derive(Debug, Clone, Error)]
pub enum MintError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("redemption code {0} does not exist")]
    NotFound(i64),
    /// Wraps the underlying storage error message verbatim. Never
    /// retried; the failure is terminal for the request.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StorageError> for MintError {
    fn from(err: StorageError) -> Self {
        MintError::Storage(err.to_string())
    }
}
