//! Rejected state transitions. Typed, recoverable, never fatal.

use crate::types::EpochMillis;

use super::error_code::{self, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Trial unavailable for {user_id}: access was force-expired by an administrator")]
    AlreadyForcedExpired { user_id: String },

    #[error("Trial already active for {user_id} until {ends_at}")]
    AlreadyActive { user_id: String, ends_at: EpochMillis },
}

impl ErrorCode for TransitionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyForcedExpired { .. } => error_code::ALREADY_FORCED_EXPIRED,
            Self::AlreadyActive { .. } => error_code::ALREADY_ACTIVE,
        }
    }
}
