//! `SqliteEntitlementStore`: file-backed `IEntitlementStore`.
//!
//! The only holder of a `Connection` in this crate. Every read and write
//! goes through the codec in `entitlement-core`, so the document format is
//! shared with the in-memory store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use entitlement_core::codec::{decode_record, encode_record};
use entitlement_core::config::StorageConfig;
use entitlement_core::errors::StoreError;
use entitlement_core::{EntitlementRecord, IEntitlementStore, UserId};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::{migrations, pragmas};

pub struct SqliteEntitlementStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteEntitlementStore {
    /// Open (or create) the database at `path`, apply PRAGMAs, run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::backend(format!("Failed to open {}: {}", path.display(), e)))?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::backend(format!("Failed to open in-memory database: {}", e)))?;
        Self::init(conn, None)
    }

    /// Open the store named by `[storage] db_path`, or an in-memory one when
    /// no path is configured.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        match config.db_path.as_deref() {
            Some(path) => Self::open(Path::new(path)),
            None => Self::open_in_memory(),
        }
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        pragmas::configure_connection(&conn).map_err(sqe)?;
        let version = migrations::migrate(&conn).map_err(sqe)?;
        debug!(path = ?path, schema_version = version, "Entitlement store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record_count(&self) -> Result<u64, StoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM entitlement_records", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n.max(0) as u64)
            .map_err(sqe)
        })
    }

    pub fn schema_version(&self) -> Result<u32, StoreError> {
        self.with_connection(|conn| migrations::get_schema_version(conn).map_err(sqe))
    }

    /// Raw connection access for maintenance and tests. Prefer the trait methods.
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl IEntitlementStore for SqliteEntitlementStore {
    fn get(&self, user_id: &UserId) -> Result<Option<EntitlementRecord>, StoreError> {
        let raw: Option<String> = self.with_connection(|conn| {
            conn.query_row(
                "SELECT record FROM entitlement_records WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(sqe)
        })?;
        raw.map(|doc| decode_record(user_id, &doc)).transpose()
    }

    fn set(&self, user_id: &UserId, record: &EntitlementRecord) -> Result<(), StoreError> {
        let doc = encode_record(record)?;
        let updated_at = chrono::Utc::now().timestamp_millis();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO entitlement_records (user_id, record, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                    record = excluded.record,
                    updated_at = excluded.updated_at",
                params![user_id.as_str(), doc, updated_at],
            )
            .map_err(sqe)?;
            Ok(())
        })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn sqe(e: impl std::fmt::Display) -> StoreError {
    StoreError::backend(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitlement_core::TrialWindow;

    fn user(id: &str) -> UserId {
        UserId::from(id)
    }

    #[test]
    fn test_open_in_memory_runs_migrations() {
        let store = SqliteEntitlementStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), migrations::CURRENT_VERSION);
        assert_eq!(store.record_count().unwrap(), 0);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_missing_user_is_none() {
        let store = SqliteEntitlementStore::open_in_memory().unwrap();
        assert!(store.get(&user("nobody")).unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_document() {
        let store = SqliteEntitlementStore::open_in_memory().unwrap();
        let u = user("u1");
        let mut record = EntitlementRecord::empty(u.clone());
        record.trial_window = Some(TrialWindow::starting_at(1_000, 86_400_000));
        store.set(&u, &record).unwrap();

        record.trial_window = None;
        record.forced_expiry = true;
        store.set(&u, &record).unwrap();

        assert_eq!(store.record_count().unwrap(), 1);
        assert_eq!(store.get(&u).unwrap(), Some(record));
    }

    #[test]
    fn test_corrupt_row_reported_as_corrupt() {
        let store = SqliteEntitlementStore::open_in_memory().unwrap();
        store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO entitlement_records (user_id, record, updated_at) VALUES ('bad', 'not json', 0)",
                    [],
                )
                .map_err(sqe)?;
                Ok(())
            })
            .unwrap();
        let err = store.get(&user("bad")).unwrap_err();
        assert!(err.is_corrupt(), "got {err:?}");
    }

    #[test]
    fn test_updated_at_is_stamped() {
        let store = SqliteEntitlementStore::open_in_memory().unwrap();
        let u = user("u1");
        store.set(&u, &EntitlementRecord::empty(u.clone())).unwrap();
        let stamp: i64 = store
            .with_connection(|conn| {
                conn.query_row(
                    "SELECT updated_at FROM entitlement_records WHERE user_id = 'u1'",
                    [],
                    |row| row.get(0),
                )
                .map_err(sqe)
            })
            .unwrap();
        assert!(stamp > 0);
    }
}
