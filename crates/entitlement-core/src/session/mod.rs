//! Session-facing surfaces: the access gate, its decisions, and the
//! login/logout lifecycle that owns a countdown.

pub mod decision;
pub mod gate;
pub mod lifecycle;

pub use decision::{AccessDecision, DenialReason};
pub use gate::AccessGate;
pub use lifecycle::EntitlementSession;
