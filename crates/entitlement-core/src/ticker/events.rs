//! Ticker events and sinks.

use crossbeam_channel::Sender;

use crate::types::{EntitlementState, EpochMillis, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerEvent {
    /// Trial still active. `remaining_millis` is derived from the stored
    /// absolute end instant on every tick.
    Tick {
        user_id: UserId,
        remaining_millis: EpochMillis,
        at: EpochMillis,
    },
    /// The trial lapsed. Published at most once per ticker; terminal.
    Expired { user_id: UserId, at: EpochMillis },
    /// Stopped because the state left `TrialActive` for a reason other than
    /// lapse (purchase, forced expiry). Terminal.
    Halted {
        user_id: UserId,
        state: EntitlementState,
        at: EpochMillis,
    },
}

impl TickerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Tick { .. })
    }
}

/// Receives ticker events on the ticker thread.
///
/// Implementations must not block for long. A sink may cancel the ticker
/// that is publishing to it; the event being published is then the last one.
pub trait TickSink: Send + 'static {
    fn publish(&self, event: TickerEvent);
}

impl TickSink for Sender<TickerEvent> {
    fn publish(&self, event: TickerEvent) {
        // Receiver gone means nobody is listening; the ticker keeps its schedule.
        let _ = self.send(event);
    }
}

/// Adapts a closure into a `TickSink`.
pub struct FnSink<F>(pub F);

impl<F> TickSink for FnSink<F>
where
    F: Fn(TickerEvent) + Send + 'static,
{
    fn publish(&self, event: TickerEvent) {
        (self.0)(event)
    }
}
