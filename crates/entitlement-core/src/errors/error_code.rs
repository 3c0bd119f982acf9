//! Stable string codes for every error variant, for logs and UI surfaces.

pub const STORE_BACKEND: &str = "STORE_BACKEND";
pub const STORE_CORRUPT: &str = "STORE_CORRUPT";
pub const STORE_LOCK_POISONED: &str = "STORE_LOCK_POISONED";
pub const SERIALIZATION: &str = "SERIALIZATION";
pub const ALREADY_FORCED_EXPIRED: &str = "ALREADY_FORCED_EXPIRED";
pub const ALREADY_ACTIVE: &str = "ALREADY_ACTIVE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const INVALID_USER_ID: &str = "INVALID_USER_ID";
pub const NO_IDENTITY: &str = "NO_IDENTITY";
pub const TICKER_ERROR: &str = "TICKER_ERROR";

/// Implemented by every error enum in the crate.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
