//! # entitlement-core
//!
//! Decides, at any instant, whether a user may access gated content.
//!
//! Three independent signals feed the decision:
//! - a time-limited free trial (24h window, granted once, implicitly)
//! - a purchased subscription (sticky once set)
//! - an administrative forced expiry (permanently revokes trial eligibility)
//!
//! ## Modules
//! - `types`: `UserId`, `EntitlementRecord`, `EntitlementState`, `Evaluation`
//! - `codec`: persisted JSON document layout with lenient per-field decoding
//! - `traits`: `IEntitlementStore`, `Clock`, `IdentityProvider`
//! - `store`: in-memory store adapter
//! - `engine`: pure transitions + the store-backed `EntitlementEngine`
//! - `ticker`: cancellable once-per-second countdown
//! - `session`: access gate, access decisions, login/logout lifecycle
//! - `admin`: administrative console (forced expiry)
//! - `config`, `errors`, `logging`: ambient plumbing

pub mod admin;
pub mod codec;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod session;
pub mod store;
pub mod ticker;
pub mod traits;
pub mod types;

pub use admin::{AdminConsole, ForceExpireReport};
pub use config::EntitlementConfig;
pub use engine::EntitlementEngine;
pub use errors::{EntitlementError, EntitlementResult, StoreError, TransitionError};
pub use session::{AccessDecision, AccessGate, DenialReason, EntitlementSession};
pub use store::InMemoryEntitlementStore;
pub use ticker::{CountdownTicker, FnSink, TickSink, TickerEvent, TickerExit, TickerHandle};
pub use traits::{
    Clock, IEntitlementStore, IdentityProvider, ManualClock, StaticIdentity, SystemClock,
};
pub use types::{EntitlementRecord, EntitlementState, EpochMillis, Evaluation, TrialWindow, UserId};
