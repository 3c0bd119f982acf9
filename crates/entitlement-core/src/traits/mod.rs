//! Seams between the engine and its collaborators.

pub mod clock;
pub mod identity;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::{IdentityProvider, StaticIdentity};
pub use store::IEntitlementStore;
