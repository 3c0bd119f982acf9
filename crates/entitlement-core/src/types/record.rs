//! Entitlement record, composite state, and evaluation result.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EpochMillis, UserId};

/// A granted trial interval. `end` is absolute; remaining time is always
/// derived from it, never counted down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialWindow {
    pub start: EpochMillis,
    pub end: EpochMillis,
}

impl TrialWindow {
    pub fn starting_at(start: EpochMillis, duration_ms: EpochMillis) -> Self {
        Self {
            start,
            end: start.saturating_add(duration_ms),
        }
    }

    /// Expiry is inclusive of the exact end instant.
    pub fn has_lapsed(&self, now: EpochMillis) -> bool {
        now >= self.end
    }

    pub fn duration_ms(&self) -> EpochMillis {
        self.end.saturating_sub(self.start)
    }
}

/// Per-user entitlement state as stored.
///
/// Invariants at rest:
/// - `trial_window` is `None` whenever `forced_expiry` is true
/// - `has_subscription` and `forced_expiry` are never cleared once set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementRecord {
    pub user_id: UserId,
    pub trial_window: Option<TrialWindow>,
    pub has_subscription: bool,
    /// Informational tag recorded at purchase (e.g. a semester id).
    pub subscribed_period_id: Option<String>,
    pub forced_expiry: bool,
    /// End instant of a trial window pruned by lazy expiry.
    pub trial_expired_at: Option<EpochMillis>,
}

impl EntitlementRecord {
    /// A record with nothing set.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            trial_window: None,
            has_subscription: false,
            subscribed_period_id: None,
            forced_expiry: false,
            trial_expired_at: None,
        }
    }
}

/// Composite access state reported to the UI and admin surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntitlementState {
    NoRecord,
    TrialActive,
    TrialExpired,
    Subscribed,
    ForcedExpired,
}

impl EntitlementState {
    pub const ALL: [EntitlementState; 5] = [
        Self::NoRecord,
        Self::TrialActive,
        Self::TrialExpired,
        Self::Subscribed,
        Self::ForcedExpired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRecord => "no_record",
            Self::TrialActive => "trial_active",
            Self::TrialExpired => "trial_expired",
            Self::Subscribed => "subscribed",
            Self::ForcedExpired => "forced_expired",
        }
    }

    pub fn is_entitled(&self) -> bool {
        matches!(self, Self::Subscribed | Self::TrialActive)
    }
}

impl fmt::Display for EntitlementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one user at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub user_id: UserId,
    pub state: EntitlementState,
    pub is_entitled: bool,
    /// Never negative. Zero outside `TrialActive`.
    pub remaining_millis: EpochMillis,
    pub evaluated_at: EpochMillis,
}
