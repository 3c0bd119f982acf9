//! RecoveryAction: what a caller should do when an entitlement operation fails.

use std::fmt;

use super::{EntitlementError, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry later (transient backend failure).
    Retry,
    /// Deny access and continue. Always safe.
    Fallback,
    /// Must be fixed by the operator or the caller.
    Escalate,
}

impl RecoveryAction {
    pub fn for_error(error: &EntitlementError) -> Self {
        match error {
            EntitlementError::Store(StoreError::Backend { .. }) => Self::Retry,
            EntitlementError::Store(StoreError::LockPoisoned(_)) => Self::Fallback,
            // Unreadable record: treat as no record.
            EntitlementError::Store(StoreError::Corrupt { .. }) => Self::Fallback,
            EntitlementError::Store(StoreError::Serialization(_)) => Self::Fallback,

            // No trial available: fall back to the subscription check.
            EntitlementError::Transition(_) => Self::Fallback,

            // Countdown is telemetry only.
            EntitlementError::Ticker(_) => Self::Fallback,

            EntitlementError::Config(_) => Self::Escalate,
            EntitlementError::InvalidUserId => Self::Escalate,
            EntitlementError::NoIdentity => Self::Escalate,
        }
    }

    /// Whether the failed operation may be treated as a denial and ignored.
    pub fn denies_access(&self) -> bool {
        matches!(self, Self::Retry | Self::Fallback)
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => write!(f, "Retry"),
            Self::Fallback => write!(f, "Fallback"),
            Self::Escalate => write!(f, "Escalate"),
        }
    }
}
