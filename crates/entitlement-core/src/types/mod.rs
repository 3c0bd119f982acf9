//! Shared data structures for the entitlement engine.

pub mod identifiers;
pub mod record;

pub use identifiers::UserId;
pub use record::{EntitlementRecord, EntitlementState, Evaluation, TrialWindow};

/// Milliseconds since the Unix epoch. The only time unit the engine uses.
pub type EpochMillis = i64;

/// Default trial length: exactly 24 hours.
pub const TRIAL_DURATION_MS: EpochMillis = 86_400_000;
