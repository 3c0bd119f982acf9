//! Top-level error type. Subsystem errors convert into it via `From`.

use super::error_code::{self, ErrorCode};
use super::{StoreError, TransitionError};

#[derive(Debug, thiserror::Error)]
pub enum EntitlementError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("transition rejected: {0}")]
    Transition(#[from] TransitionError),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid user id: must not be blank")]
    InvalidUserId,

    #[error("no user identity resolved")]
    NoIdentity,

    #[error("ticker error: {0}")]
    Ticker(String),
}

impl ErrorCode for EntitlementError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Transition(e) => e.error_code(),
            Self::Config(_) => error_code::CONFIG_ERROR,
            Self::InvalidUserId => error_code::INVALID_USER_ID,
            Self::NoIdentity => error_code::NO_IDENTITY,
            Self::Ticker(_) => error_code::TICKER_ERROR,
        }
    }
}

/// Convenience type alias.
pub type EntitlementResult<T> = Result<T, EntitlementError>;
