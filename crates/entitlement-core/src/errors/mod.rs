//! Error types (thiserror), stable error codes, and recovery guidance.
//!
//! Nothing in this subsystem is fatal: every error resolves to a denial of
//! access, which is always safe.

pub mod entitlement_error;
pub mod error_code;
pub mod recovery;
pub mod store_error;
pub mod transition_error;

pub use entitlement_error::{EntitlementError, EntitlementResult};
pub use error_code::ErrorCode;
pub use recovery::RecoveryAction;
pub use store_error::StoreError;
pub use transition_error::TransitionError;
