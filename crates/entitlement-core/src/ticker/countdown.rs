//! CountdownTicker: dedicated thread, crossbeam cancel channel.
//!
//! The thread waits on the cancel channel with `recv_timeout(period)`, so a
//! cancel wakes it immediately. `TickerHandle::cancel` joins the thread:
//! once it returns, no further sink call can happen.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::config::TickerConfig;
use crate::engine::EntitlementEngine;
use crate::errors::{EntitlementError, EntitlementResult};
use crate::traits::{Clock, IEntitlementStore};
use crate::types::{EntitlementState, UserId};

use super::events::{TickSink, TickerEvent};

/// Why a ticker thread stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerExit {
    Cancelled,
    Expired,
    Halted(EntitlementState),
}

pub struct CountdownTicker;

impl CountdownTicker {
    /// Start a ticker for `user_id` if, and only if, the user's trial is
    /// currently the active entitlement. Returns `Ok(None)` for every other
    /// state (subscribed users, forced expiry, no record, lapsed trial).
    pub fn start<S, K>(
        engine: Arc<EntitlementEngine<S>>,
        clock: Arc<dyn Clock>,
        user_id: UserId,
        config: &TickerConfig,
        sink: K,
    ) -> EntitlementResult<Option<TickerHandle>>
    where
        S: IEntitlementStore + 'static,
        K: TickSink,
    {
        let eval = engine.evaluate(&user_id, clock.now_millis())?;
        if eval.state != EntitlementState::TrialActive {
            debug!(user_id = %user_id, state = eval.state.as_str(), "No countdown for state");
            return Ok(None);
        }

        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let period = config.period();
        let thread_user = user_id.clone();
        let thread = thread::Builder::new()
            .name(format!("entitlement-ticker-{}", user_id))
            .spawn(move || ticker_loop(engine, clock, thread_user, period, sink, cancel_rx))
            .map_err(|e| EntitlementError::Ticker(format!("failed to spawn ticker thread: {}", e)))?;

        info!(
            user_id = %user_id,
            remaining_millis = eval.remaining_millis,
            period_ms = period.as_millis() as u64,
            "Countdown started"
        );
        Ok(Some(TickerHandle {
            user_id,
            cancel_tx: Some(cancel_tx),
            thread: Some(thread),
        }))
    }
}

/// Owner of a running ticker. Dropping it cancels the ticker.
pub struct TickerHandle {
    user_id: UserId,
    cancel_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<TickerExit>>,
}

impl TickerHandle {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// True once the ticker thread has stopped on its own or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Stop the ticker and wait for its thread. Idempotent.
    ///
    /// Returns how the ticker ended, or `None` if it was already cancelled.
    pub fn cancel(&mut self) -> Option<TickerExit> {
        let thread = self.thread.take()?;
        if let Some(tx) = self.cancel_tx.take() {
            // Fails only if the thread already exited.
            let _ = tx.send(());
        }

        if thread.thread().id() == thread::current().id() {
            // Called from inside a sink on the ticker thread; the loop exits
            // on its next wait. Joining here would deadlock.
            return None;
        }

        match thread.join() {
            Ok(exit) => {
                debug!(user_id = %self.user_id, exit = ?exit, "Countdown stopped");
                Some(exit)
            }
            Err(_) => {
                warn!(user_id = %self.user_id, "Ticker thread panicked");
                None
            }
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn ticker_loop<S, K>(
    engine: Arc<EntitlementEngine<S>>,
    clock: Arc<dyn Clock>,
    user_id: UserId,
    period: Duration,
    sink: K,
    cancel_rx: Receiver<()>,
) -> TickerExit
where
    S: IEntitlementStore,
    K: TickSink,
{
    loop {
        let now = clock.now_millis();
        match engine.evaluate(&user_id, now) {
            Ok(eval) => match eval.state {
                EntitlementState::TrialActive => sink.publish(TickerEvent::Tick {
                    user_id: user_id.clone(),
                    remaining_millis: eval.remaining_millis,
                    at: now,
                }),
                EntitlementState::TrialExpired => {
                    info!(user_id = %user_id, at = now, "Trial expired");
                    sink.publish(TickerEvent::Expired {
                        user_id: user_id.clone(),
                        at: now,
                    });
                    return TickerExit::Expired;
                }
                state => {
                    debug!(user_id = %user_id, state = state.as_str(), "Countdown halted");
                    sink.publish(TickerEvent::Halted {
                        user_id: user_id.clone(),
                        state,
                        at: now,
                    });
                    return TickerExit::Halted(state);
                }
            },
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Tick evaluation failed; retrying next period");
            }
        }

        match cancel_rx.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return TickerExit::Cancelled,
        }
    }
}
