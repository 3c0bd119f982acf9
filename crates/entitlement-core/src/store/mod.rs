//! In-process store adapter. The durable SQLite adapter lives in
//! `entitlement-storage`.

pub mod memory;

pub use memory::InMemoryEntitlementStore;
