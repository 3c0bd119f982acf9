//! EntitlementEngine: evaluate, transition, persist.
//!
//! Read-modify-write operations are serialized by `write_lock`, so a
//! ticker thread's lazy expiry can never overwrite a concurrent
//! `force_expire` or `purchase` for the same user.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::config::TrialConfig;
use crate::errors::{EntitlementError, EntitlementResult, StoreError};
use crate::traits::IEntitlementStore;
use crate::types::{EntitlementRecord, EpochMillis, Evaluation, TrialWindow, UserId};

use super::transitions;

pub struct EntitlementEngine<S: IEntitlementStore> {
    store: S,
    trial_duration_ms: EpochMillis,
    write_lock: Mutex<()>,
}

impl<S: IEntitlementStore> EntitlementEngine<S> {
    /// Engine with the default 24h trial.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &TrialConfig::default())
    }

    pub fn with_config(store: S, config: &TrialConfig) -> Self {
        Self {
            store,
            trial_duration_ms: config.duration_ms,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn trial_duration_ms(&self) -> EpochMillis {
        self.trial_duration_ms
    }

    /// Compute the composite state at `now`.
    ///
    /// A stored window that has lapsed is pruned in the store before
    /// `TrialExpired` is returned. `NoRecord` has no side effect.
    pub fn evaluate(&self, user_id: &UserId, now: EpochMillis) -> EntitlementResult<Evaluation> {
        check_user(user_id)?;
        let _guard = self.guard()?;

        let mut record = self.load(user_id)?;
        if let Some(pruned) = record.as_ref().and_then(|r| transitions::expire_lapsed(r, now)) {
            self.store.set(user_id, &pruned)?;
            debug!(
                user_id = %user_id,
                ended_at = ?pruned.trial_expired_at,
                backend = self.store.backend_name(),
                "Lapsed trial window pruned"
            );
            record = Some(pruned);
        }

        let state = transitions::composite_state(record.as_ref(), now);
        Ok(Evaluation {
            user_id: user_id.clone(),
            state,
            is_entitled: state.is_entitled(),
            remaining_millis: transitions::remaining_millis(record.as_ref(), now),
            evaluated_at: now,
        })
    }

    /// Grant a trial starting at `now`.
    ///
    /// Fails with `TransitionError::AlreadyForcedExpired` or
    /// `TransitionError::AlreadyActive`.
    pub fn start_trial(&self, user_id: &UserId, now: EpochMillis) -> EntitlementResult<TrialWindow> {
        check_user(user_id)?;
        let _guard = self.guard()?;

        let record = self.load(user_id)?;
        let next = transitions::start_trial(record, user_id, now, self.trial_duration_ms)?;
        self.store.set(user_id, &next)?;

        // start_trial always sets a window on success.
        let window = next
            .trial_window
            .unwrap_or_else(|| TrialWindow::starting_at(now, self.trial_duration_ms));
        info!(user_id = %user_id, start = window.start, end = window.end, "Trial granted");
        Ok(window)
    }

    /// Mark the user subscribed. Idempotent; `period_id` is overwritten.
    pub fn purchase(&self, user_id: &UserId, period_id: &str, now: EpochMillis) -> EntitlementResult<()> {
        check_user(user_id)?;
        let _guard = self.guard()?;

        let record = self.load(user_id)?;
        let already = record.as_ref().is_some_and(|r| r.has_subscription);
        let next = transitions::purchase(record, user_id, period_id);
        self.store.set(user_id, &next)?;
        info!(user_id = %user_id, period_id, at = now, renewed = already, "Subscription recorded");
        Ok(())
    }

    /// Revoke trial eligibility permanently. Idempotent. A subscription, if
    /// any, is left in place and keeps the user entitled.
    pub fn force_expire(&self, user_id: &UserId, now: EpochMillis) -> EntitlementResult<()> {
        check_user(user_id)?;
        let _guard = self.guard()?;

        let record = self.load(user_id)?;
        let next = transitions::force_expire(record, user_id);
        self.store.set(user_id, &next)?;
        info!(
            user_id = %user_id,
            at = now,
            subscribed = next.has_subscription,
            "Trial force-expired"
        );
        Ok(())
    }

    /// Stored record, with unreadable documents reported as absent.
    pub fn record(&self, user_id: &UserId) -> EntitlementResult<Option<EntitlementRecord>> {
        check_user(user_id)?;
        self.load(user_id)
    }

    fn load(&self, user_id: &UserId) -> EntitlementResult<Option<EntitlementRecord>> {
        match self.store.get(user_id) {
            Ok(record) => Ok(record),
            Err(StoreError::Corrupt { details, .. }) => {
                warn!(
                    user_id = %user_id,
                    details = %details,
                    backend = self.store.backend_name(),
                    "Discarding unreadable entitlement record"
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn guard(&self) -> EntitlementResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| EntitlementError::from(StoreError::LockPoisoned(e.to_string())))
    }
}

fn check_user(user_id: &UserId) -> EntitlementResult<()> {
    if user_id.is_blank() {
        return Err(EntitlementError::InvalidUserId);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransitionError;
    use crate::store::InMemoryEntitlementStore;
    use crate::types::{EntitlementState, TRIAL_DURATION_MS};

    const T0: EpochMillis = 1_700_000_000_000;

    fn engine() -> EntitlementEngine<InMemoryEntitlementStore> {
        EntitlementEngine::new(InMemoryEntitlementStore::new())
    }

    #[test]
    fn test_evaluate_no_record_has_no_side_effect() {
        let engine = engine();
        let eval = engine.evaluate(&UserId::from("new"), T0).unwrap();
        assert_eq!(eval.state, EntitlementState::NoRecord);
        assert!(!eval.is_entitled);
        assert_eq!(eval.remaining_millis, 0);
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_start_trial_then_evaluate_exact_duration() {
        let engine = engine();
        let u = UserId::from("u");
        let window = engine.start_trial(&u, T0).unwrap();
        assert_eq!(window.end - window.start, TRIAL_DURATION_MS);

        let eval = engine.evaluate(&u, T0).unwrap();
        assert_eq!(eval.state, EntitlementState::TrialActive);
        assert_eq!(eval.remaining_millis, 86_400_000);
        assert!(eval.is_entitled);
    }

    #[test]
    fn test_boundary_instant_is_expired() {
        let engine = engine();
        let u = UserId::from("u");
        engine.start_trial(&u, T0).unwrap();
        let eval = engine.evaluate(&u, T0 + 86_400_000).unwrap();
        assert!(!eval.is_entitled);
        assert_eq!(eval.state, EntitlementState::TrialExpired);
        assert_eq!(eval.remaining_millis, 0);
    }

    #[test]
    fn test_lazy_expiry_persists() {
        let engine = engine();
        let u = UserId::from("u");
        engine.start_trial(&u, T0).unwrap();
        engine.evaluate(&u, T0 + 86_400_001).unwrap();

        let stored = engine.store().get(&u).unwrap().unwrap();
        assert!(stored.trial_window.is_none());
        assert_eq!(stored.trial_expired_at, Some(T0 + 86_400_000));
    }

    #[test]
    fn test_force_expire_blocks_trial() {
        let engine = engine();
        let u = UserId::from("u");
        engine.force_expire(&u, T0).unwrap();
        engine.force_expire(&u, T0).unwrap();
        let err = engine.start_trial(&u, T0 + 1).unwrap_err();
        assert!(matches!(
            err,
            EntitlementError::Transition(TransitionError::AlreadyForcedExpired { .. })
        ));
    }

    #[test]
    fn test_subscription_survives_forced_expiry() {
        let engine = engine();
        let u = UserId::from("u");
        engine.force_expire(&u, T0).unwrap();
        engine.purchase(&u, "sem-1", T0 + 1).unwrap();
        let eval = engine.evaluate(&u, T0 + 2).unwrap();
        assert_eq!(eval.state, EntitlementState::Subscribed);
        assert!(eval.is_entitled);
    }

    #[test]
    fn test_corrupt_record_treated_as_no_record() {
        let engine = engine();
        let u = UserId::from("u");
        engine.store().insert_raw(&u, "\u{0}garbage").unwrap();
        let eval = engine.evaluate(&u, T0).unwrap();
        assert_eq!(eval.state, EntitlementState::NoRecord);

        // A fresh trial overwrites the unreadable document.
        engine.start_trial(&u, T0).unwrap();
        assert_eq!(engine.evaluate(&u, T0).unwrap().state, EntitlementState::TrialActive);
    }

    #[test]
    fn test_blank_user_rejected() {
        let engine = engine();
        let err = engine.evaluate(&UserId::from(" "), T0).unwrap_err();
        assert!(matches!(err, EntitlementError::InvalidUserId));
    }

    #[test]
    fn test_custom_trial_duration() {
        let engine = EntitlementEngine::with_config(
            InMemoryEntitlementStore::new(),
            &TrialConfig { duration_ms: 5_000 },
        );
        let u = UserId::from("u");
        engine.start_trial(&u, T0).unwrap();
        assert_eq!(engine.evaluate(&u, T0 + 1_000).unwrap().remaining_millis, 4_000);
        assert!(!engine.evaluate(&u, T0 + 5_000).unwrap().is_entitled);
    }
}
