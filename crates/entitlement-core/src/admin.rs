//! AdminConsole: out-of-band administrative actions.
//!
//! Operator authentication belongs to the admin surface. No operation lifts
//! a forced expiry.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::engine::EntitlementEngine;
use crate::errors::EntitlementResult;
use crate::traits::{Clock, IEntitlementStore};
use crate::types::{EntitlementState, EpochMillis, Evaluation, UserId};

/// Outcome of a forced expiry, for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForceExpireReport {
    pub user_id: UserId,
    pub at: EpochMillis,
    pub state_after: EntitlementState,
    /// The user still holds a subscription and therefore remains entitled.
    pub subscription_retained: bool,
}

pub struct AdminConsole<S: IEntitlementStore> {
    engine: Arc<EntitlementEngine<S>>,
    clock: Arc<dyn Clock>,
}

impl<S: IEntitlementStore> AdminConsole<S> {
    pub fn new(engine: Arc<EntitlementEngine<S>>, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }

    /// Revoke trial eligibility for `user_id`. Idempotent; works for users
    /// who have never been seen.
    pub fn force_expire(&self, user_id: &UserId) -> EntitlementResult<ForceExpireReport> {
        let now = self.clock.now_millis();
        self.engine.force_expire(user_id, now)?;
        let after = self.engine.evaluate(user_id, now)?;

        let subscription_retained = after.state == EntitlementState::Subscribed;
        if subscription_retained {
            warn!(
                user_id = %user_id,
                "Forced expiry recorded, but the user holds a subscription and stays entitled"
            );
        }
        Ok(ForceExpireReport {
            user_id: user_id.clone(),
            at: now,
            state_after: after.state,
            subscription_retained,
        })
    }

    /// Current evaluation for `user_id`. Never grants a trial.
    pub fn inspect(&self, user_id: &UserId) -> EntitlementResult<Evaluation> {
        self.engine.evaluate(user_id, self.clock.now_millis())
    }
}
