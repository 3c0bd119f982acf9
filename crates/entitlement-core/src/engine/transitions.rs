//! Pure state transitions over a user's record.
//!
//! Precedence for the reported state:
//! Subscribed > ForcedExpired > trial window (active / lapsed) >
//! pruned trial > NoRecord.

use crate::errors::TransitionError;
use crate::types::{EntitlementRecord, EntitlementState, EpochMillis, TrialWindow, UserId};

/// Composite state of `record` at `now`.
pub fn composite_state(record: Option<&EntitlementRecord>, now: EpochMillis) -> EntitlementState {
    let Some(record) = record else {
        return EntitlementState::NoRecord;
    };
    if record.has_subscription {
        return EntitlementState::Subscribed;
    }
    if record.forced_expiry {
        return EntitlementState::ForcedExpired;
    }
    match record.trial_window {
        Some(window) if window.has_lapsed(now) => EntitlementState::TrialExpired,
        Some(_) => EntitlementState::TrialActive,
        None if record.trial_expired_at.is_some() => EntitlementState::TrialExpired,
        None => EntitlementState::NoRecord,
    }
}

/// Remaining trial time at `now`. Zero unless the trial is the active
/// entitlement; never negative and never more than one full window, even
/// when `now` is earlier than the grant instant.
pub fn remaining_millis(record: Option<&EntitlementRecord>, now: EpochMillis) -> EpochMillis {
    if composite_state(record, now) != EntitlementState::TrialActive {
        return 0;
    }
    record
        .and_then(|r| r.trial_window)
        .map(|w| w.end.saturating_sub(now).min(w.duration_ms()).max(0))
        .unwrap_or(0)
}

/// Lazy expiry: if the stored window has lapsed at `now`, return the record
/// with the window pruned and its end instant remembered.
pub fn expire_lapsed(record: &EntitlementRecord, now: EpochMillis) -> Option<EntitlementRecord> {
    let window = record.trial_window?;
    if !window.has_lapsed(now) {
        return None;
    }
    let mut next = record.clone();
    next.trial_window = None;
    next.trial_expired_at = Some(window.end);
    Some(next)
}

/// Grant a trial window `[now, now + duration_ms)`.
pub fn start_trial(
    record: Option<EntitlementRecord>,
    user_id: &UserId,
    now: EpochMillis,
    duration_ms: EpochMillis,
) -> Result<EntitlementRecord, TransitionError> {
    let mut next = record.unwrap_or_else(|| EntitlementRecord::empty(user_id.clone()));
    if next.forced_expiry {
        return Err(TransitionError::AlreadyForcedExpired {
            user_id: user_id.to_string(),
        });
    }
    if let Some(window) = next.trial_window {
        if !window.has_lapsed(now) {
            return Err(TransitionError::AlreadyActive {
                user_id: user_id.to_string(),
                ends_at: window.end,
            });
        }
    }
    next.trial_window = Some(TrialWindow::starting_at(now, duration_ms));
    Ok(next)
}

/// Record a purchase. Idempotent; the period tag is overwritten.
pub fn purchase(
    record: Option<EntitlementRecord>,
    user_id: &UserId,
    period_id: &str,
) -> EntitlementRecord {
    let mut next = record.unwrap_or_else(|| EntitlementRecord::empty(user_id.clone()));
    next.has_subscription = true;
    next.subscribed_period_id = Some(period_id.to_string());
    next
}

/// Permanently revoke trial eligibility. Leaves the subscription alone.
pub fn force_expire(record: Option<EntitlementRecord>, user_id: &UserId) -> EntitlementRecord {
    let mut next = record.unwrap_or_else(|| EntitlementRecord::empty(user_id.clone()));
    next.forced_expiry = true;
    next.trial_window = None;
    next
}
