//! AccessGate: the session-facing query API.
//!
//! The first check for a user with no record grants the trial. A rejected
//! grant is not an error here: the gate falls back to whatever the
//! evaluation says (i.e. the subscription check). Store failures deny.

use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::EntitlementEngine;
use crate::errors::{EntitlementError, RecoveryAction};
use crate::traits::{Clock, IEntitlementStore, IdentityProvider};
use crate::types::{EntitlementState, EpochMillis, UserId};

use super::decision::{AccessDecision, DenialReason};

pub struct AccessGate<S: IEntitlementStore> {
    engine: Arc<EntitlementEngine<S>>,
    clock: Arc<dyn Clock>,
}

impl<S: IEntitlementStore> AccessGate<S> {
    pub fn new(engine: Arc<EntitlementEngine<S>>, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }

    pub fn engine(&self) -> &Arc<EntitlementEngine<S>> {
        &self.engine
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Decide access for `user_id` now, granting the trial on first sight.
    pub fn check(&self, user_id: &UserId) -> AccessDecision {
        let now = self.clock.now_millis();

        let eval = match self.engine.evaluate(user_id, now) {
            Ok(eval) => eval,
            Err(e) => return deny_on_error(user_id, &e),
        };
        if eval.state != EntitlementState::NoRecord {
            return AccessDecision::from_evaluation(&eval);
        }

        match self.engine.start_trial(user_id, now) {
            Ok(_) => match self.engine.evaluate(user_id, now) {
                Ok(granted) => AccessDecision::from_evaluation(&granted),
                Err(e) => deny_on_error(user_id, &e),
            },
            Err(EntitlementError::Transition(rejected)) => {
                // Another caller may have written the record since `eval`.
                info!(user_id = %user_id, reason = %rejected, "No trial available; re-evaluating");
                match self.engine.evaluate(user_id, now) {
                    Ok(current) => AccessDecision::from_evaluation(&current),
                    Err(e) => deny_on_error(user_id, &e),
                }
            }
            Err(e) => deny_on_error(user_id, &e),
        }
    }

    /// Decide access for whoever the identity provider reports.
    pub fn check_identity(&self, identity: &dyn IdentityProvider) -> AccessDecision {
        match identity.current_user_id() {
            Some(user_id) => self.check(&user_id),
            None => AccessDecision::deny(None, DenialReason::NoIdentity),
        }
    }

    pub fn is_entitled(&self, user_id: &UserId) -> bool {
        self.check(user_id).allowed
    }

    pub fn remaining_millis(&self, user_id: &UserId) -> EpochMillis {
        self.check(user_id).remaining_millis
    }

    pub fn entitlement_state(&self, user_id: &UserId) -> EntitlementState {
        self.check(user_id).state
    }
}

fn deny_on_error(user_id: &UserId, error: &EntitlementError) -> AccessDecision {
    let action = RecoveryAction::for_error(error);
    warn!(user_id = %user_id, error = %error, action = %action, "Entitlement check failed; denying");
    let reason = match error {
        EntitlementError::InvalidUserId => DenialReason::InvalidUserId,
        EntitlementError::NoIdentity => DenialReason::NoIdentity,
        _ => DenialReason::StoreUnavailable,
    };
    AccessDecision::deny(Some(user_id.clone()), reason)
}
