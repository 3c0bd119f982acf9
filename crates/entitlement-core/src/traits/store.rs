//! `IEntitlementStore` trait: keyed per-user record persistence.
//!
//! Pure storage, no policy. A missing key is indistinguishable from
//! `NoRecord`, and a write is visible to the next read on the same store.

use std::sync::Arc;

use crate::errors::StoreError;
use crate::types::{EntitlementRecord, UserId};

pub trait IEntitlementStore: Send + Sync {
    /// Load the record stored under `user_id`.
    ///
    /// Returns `Err(StoreError::Corrupt)` when a document exists but cannot
    /// be decoded; the engine treats that as no record.
    fn get(&self, user_id: &UserId) -> Result<Option<EntitlementRecord>, StoreError>;

    /// Replace the record stored under `user_id`.
    fn set(&self, user_id: &UserId, record: &EntitlementRecord) -> Result<(), StoreError>;

    /// Short backend label for logs ("memory", "sqlite").
    fn backend_name(&self) -> &'static str;
}

impl<T: IEntitlementStore + ?Sized> IEntitlementStore for Arc<T> {
    fn get(&self, user_id: &UserId) -> Result<Option<EntitlementRecord>, StoreError> {
        (**self).get(user_id)
    }

    fn set(&self, user_id: &UserId, record: &EntitlementRecord) -> Result<(), StoreError> {
        (**self).set(user_id, record)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
