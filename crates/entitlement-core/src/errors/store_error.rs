//! Persistence-layer errors.

use super::error_code::{self, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend error: {message}")]
    Backend { message: String },

    #[error("Stored record for {user_id} is unreadable: {details}")]
    Corrupt { user_id: String, details: String },

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Backend { .. } => error_code::STORE_BACKEND,
            Self::Corrupt { .. } => error_code::STORE_CORRUPT,
            Self::LockPoisoned(_) => error_code::STORE_LOCK_POISONED,
            Self::Serialization(_) => error_code::SERIALIZATION,
        }
    }
}
