//! Countdown ticker: a cancellable, once-per-period re-evaluation of one
//! user's trial, publishing remaining time and a single terminal event.

pub mod countdown;
pub mod events;

pub use countdown::{CountdownTicker, TickerExit, TickerHandle};
pub use events::{FnSink, TickSink, TickerEvent};
