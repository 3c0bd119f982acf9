//! Allow/deny decisions handed to route guards.

use serde::Serialize;

use crate::types::{EntitlementState, EpochMillis, Evaluation, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenialReason {
    NoIdentity,
    InvalidUserId,
    TrialExpired,
    ForcedExpired,
    NoEntitlement,
    StoreUnavailable,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoIdentity => "no_identity",
            Self::InvalidUserId => "invalid_user_id",
            Self::TrialExpired => "trial_expired",
            Self::ForcedExpired => "forced_expired",
            Self::NoEntitlement => "no_entitlement",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub user_id: Option<UserId>,
    pub allowed: bool,
    pub state: EntitlementState,
    pub remaining_millis: EpochMillis,
    pub reason: Option<DenialReason>,
}

impl AccessDecision {
    pub fn from_evaluation(eval: &Evaluation) -> Self {
        let reason = match eval.state {
            EntitlementState::TrialActive | EntitlementState::Subscribed => None,
            EntitlementState::TrialExpired => Some(DenialReason::TrialExpired),
            EntitlementState::ForcedExpired => Some(DenialReason::ForcedExpired),
            EntitlementState::NoRecord => Some(DenialReason::NoEntitlement),
        };
        Self {
            user_id: Some(eval.user_id.clone()),
            allowed: eval.is_entitled,
            state: eval.state,
            remaining_millis: eval.remaining_millis,
            reason,
        }
    }

    /// Denial carrying no state information.
    pub fn deny(user_id: Option<UserId>, reason: DenialReason) -> Self {
        Self {
            user_id,
            allowed: false,
            state: EntitlementState::NoRecord,
            remaining_millis: 0,
            reason: Some(reason),
        }
    }
}
