//! `InMemoryEntitlementStore`: map-backed `IEntitlementStore`.
//!
//! Holds encoded documents rather than decoded records so reads go through
//! the same codec as the durable store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::codec::{decode_record, encode_record};
use crate::errors::StoreError;
use crate::traits::IEntitlementStore;
use crate::types::{EntitlementRecord, UserId};

#[derive(Debug, Default)]
pub struct InMemoryEntitlementStore {
    documents: Mutex<HashMap<UserId, String>>,
}

impl InMemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document under `user_id`, bypassing the encoder.
    pub fn insert_raw(&self, user_id: &UserId, raw: &str) -> Result<(), StoreError> {
        self.lock()?.insert(user_id.clone(), raw.to_string());
        Ok(())
    }

    /// Raw stored document, if any.
    pub fn raw(&self, user_id: &UserId) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<UserId, String>>, StoreError> {
        self.documents
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl IEntitlementStore for InMemoryEntitlementStore {
    fn get(&self, user_id: &UserId) -> Result<Option<EntitlementRecord>, StoreError> {
        let raw = self.lock()?.get(user_id).cloned();
        raw.map(|doc| decode_record(user_id, &doc)).transpose()
    }

    fn set(&self, user_id: &UserId, record: &EntitlementRecord) -> Result<(), StoreError> {
        let doc = encode_record(record)?;
        self.lock()?.insert(user_id.clone(), doc);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrialWindow;

    #[test]
    fn test_missing_key_is_none() {
        let store = InMemoryEntitlementStore::new();
        assert!(store.get(&UserId::from("nobody")).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_visible_to_next_read() {
        let store = InMemoryEntitlementStore::new();
        let user = UserId::from("a");
        let mut record = EntitlementRecord::empty(user.clone());
        record.trial_window = Some(TrialWindow { start: 1, end: 2 });
        store.set(&user, &record).unwrap();
        assert_eq!(store.get(&user).unwrap(), Some(record));
    }

    #[test]
    fn test_records_scoped_per_user() {
        let store = InMemoryEntitlementStore::new();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        let mut record = EntitlementRecord::empty(alice.clone());
        record.has_subscription = true;
        store.set(&alice, &record).unwrap();

        assert!(store.get(&bob).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_corrupt_document_surfaces_as_corrupt() {
        let store = InMemoryEntitlementStore::new();
        let user = UserId::from("c");
        store.insert_raw(&user, "{{{").unwrap();
        assert!(store.get(&user).unwrap_err().is_corrupt());
    }
}
