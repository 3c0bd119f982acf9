//! Entitlement engine.
//!
//! - **transitions**: pure `(record, now, args) -> record'` functions and
//!   composite-state precedence
//! - **entitlement_engine**: `EntitlementEngine`: loads, evaluates,
//!   transitions, and persists records through an `IEntitlementStore`

pub mod entitlement_engine;
pub mod transitions;

pub use entitlement_engine::EntitlementEngine;
