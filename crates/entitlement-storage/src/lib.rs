//! # entitlement-storage
//!
//! SQLite persistence for entitlement records. One row per user holds the
//! camelCase JSON document produced by `entitlement_core::codec`, so records
//! written here read back identically through any other store backend.

pub mod engine;
pub mod migrations;
pub mod pragmas;
pub mod schema;

pub use engine::SqliteEntitlementStore;
