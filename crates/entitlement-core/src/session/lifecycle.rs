//! EntitlementSession: login/logout lifecycle around the access gate.
//!
//! Beginning a session resolves the user, runs the gate (granting the trial
//! on first login), and starts a countdown while the trial is the active
//! entitlement. Ending it cancels the countdown; stored entitlement state
//! is kept for the next session.

use tracing::{info, warn};

use crate::config::TickerConfig;
use crate::errors::{EntitlementError, EntitlementResult};
use crate::ticker::{CountdownTicker, TickSink, TickerExit, TickerHandle};
use crate::traits::{IEntitlementStore, IdentityProvider};
use crate::types::{EntitlementState, UserId};

use super::decision::AccessDecision;
use super::gate::AccessGate;

pub struct EntitlementSession {
    user_id: UserId,
    decision: AccessDecision,
    ticker: Option<TickerHandle>,
}

impl EntitlementSession {
    /// Start a session for the signed-in user.
    pub fn begin<S, K>(
        gate: &AccessGate<S>,
        identity: &dyn IdentityProvider,
        ticker_config: &TickerConfig,
        sink: K,
    ) -> EntitlementResult<Self>
    where
        S: IEntitlementStore + 'static,
        K: TickSink,
    {
        let user_id = identity.current_user_id().ok_or(EntitlementError::NoIdentity)?;
        if user_id.is_blank() {
            return Err(EntitlementError::InvalidUserId);
        }
        let decision = gate.check(&user_id);

        let ticker = if decision.state == EntitlementState::TrialActive {
            match CountdownTicker::start(
                gate.engine().clone(),
                gate.clock().clone(),
                user_id.clone(),
                ticker_config,
                sink,
            ) {
                Ok(handle) => handle,
                Err(e) => {
                    // Countdown is telemetry; access was already decided.
                    warn!(user_id = %user_id, error = %e, "Countdown unavailable for session");
                    None
                }
            }
        } else {
            None
        };

        info!(
            user_id = %user_id,
            state = decision.state.as_str(),
            allowed = decision.allowed,
            countdown = ticker.is_some(),
            "Session started"
        );
        Ok(Self {
            user_id,
            decision,
            ticker,
        })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Decision taken when the session began.
    pub fn decision(&self) -> &AccessDecision {
        &self.decision
    }

    /// Whether a countdown is still running.
    pub fn has_countdown(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Log out: cancel the countdown synchronously. No tick fires after this
    /// returns. Stored records are untouched.
    pub fn end(mut self) -> Option<TickerExit> {
        let exit = self.ticker.take().and_then(|mut t| t.cancel());
        info!(user_id = %self.user_id, exit = ?exit, "Session ended");
        exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crossbeam_channel::unbounded;

    use crate::engine::EntitlementEngine;
    use crate::store::InMemoryEntitlementStore;
    use crate::ticker::TickerEvent;
    use crate::traits::{ManualClock, StaticIdentity};
    use crate::types::EpochMillis;

    const T0: EpochMillis = 1_700_000_000_000;

    fn gate() -> AccessGate<InMemoryEntitlementStore> {
        let engine = Arc::new(EntitlementEngine::new(InMemoryEntitlementStore::new()));
        AccessGate::new(engine, Arc::new(ManualClock::new(T0)))
    }

    fn fast() -> TickerConfig {
        TickerConfig { period_ms: 5 }
    }

    #[test]
    fn test_begin_requires_identity() {
        let (tx, _rx) = unbounded::<TickerEvent>();
        let err = EntitlementSession::begin(&gate(), &StaticIdentity::signed_out(), &fast(), tx)
            .err()
            .unwrap();
        assert!(matches!(err, EntitlementError::NoIdentity));
    }

    #[test]
    fn test_new_user_session_runs_countdown_until_logout() {
        let gate = gate();
        let (tx, rx) = unbounded();
        let session =
            EntitlementSession::begin(&gate, &StaticIdentity::signed_in("s1"), &fast(), tx).unwrap();
        assert!(session.decision().allowed);
        assert!(session.has_countdown());
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            TickerEvent::Tick { .. }
        ));

        assert_eq!(session.end(), Some(TickerExit::Cancelled));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        // Logout keeps the record.
        let record = gate.engine().record(&UserId::from("s1")).unwrap().unwrap();
        assert!(record.trial_window.is_some());
    }

    #[test]
    fn test_subscriber_session_has_no_countdown() {
        let gate = gate();
        let u = UserId::from("paid");
        gate.engine().purchase(&u, "sem-1", T0).unwrap();
        let (tx, _rx) = unbounded();
        let session =
            EntitlementSession::begin(&gate, &StaticIdentity::signed_in("paid"), &fast(), tx).unwrap();
        assert!(session.decision().allowed);
        assert_eq!(session.decision().state, EntitlementState::Subscribed);
        assert!(!session.has_countdown());
        assert_eq!(session.end(), None);
    }
}
