//! The engine running over the SQLite store: durability across reopen,
//! per-user scoping, and the corruption policy on real rows.

use std::sync::Arc;

use entitlement_core::{
    AccessGate, AdminConsole, EntitlementEngine, EntitlementState, EpochMillis,
    IEntitlementStore, ManualClock, UserId,
};
use entitlement_storage::SqliteEntitlementStore;
use tempfile::TempDir;

const T0: EpochMillis = 1_726_000_000_000;
const DAY: EpochMillis = 86_400_000;

fn open(dir: &TempDir) -> EntitlementEngine<SqliteEntitlementStore> {
    let store = SqliteEntitlementStore::open(&dir.path().join("entitlements.db")).unwrap();
    EntitlementEngine::new(store)
}

#[test]
fn trial_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let u = UserId::from("student");
    {
        let engine = open(&dir);
        engine.start_trial(&u, T0).unwrap();
    }

    let engine = open(&dir);
    let eval = engine.evaluate(&u, T0 + 1_000).unwrap();
    assert_eq!(eval.state, EntitlementState::TrialActive);
    assert_eq!(eval.remaining_millis, DAY - 1_000);
}

#[test]
fn lazy_expiry_is_durable() {
    let dir = TempDir::new().unwrap();
    let u = UserId::from("student");
    {
        let engine = open(&dir);
        engine.start_trial(&u, T0).unwrap();
        assert_eq!(
            engine.evaluate(&u, T0 + DAY).unwrap().state,
            EntitlementState::TrialExpired
        );
    }

    let engine = open(&dir);
    let record = engine.store().get(&u).unwrap().unwrap();
    assert!(record.trial_window.is_none());
    assert_eq!(record.trial_expired_at, Some(T0 + DAY));
}

#[test]
fn forced_expiry_and_subscription_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let forced = UserId::from("forced");
    let paid = UserId::from("paid");
    {
        let engine = open(&dir);
        engine.start_trial(&forced, T0).unwrap();
        engine.force_expire(&forced, T0 + 500).unwrap();
        engine.purchase(&paid, "sem-1", T0).unwrap();
    }

    let engine = open(&dir);
    assert_eq!(engine.store().record_count().unwrap(), 2);
    assert_eq!(
        engine.evaluate(&forced, T0 + 600).unwrap().state,
        EntitlementState::ForcedExpired
    );
    assert!(engine.start_trial(&forced, T0 + 700).is_err());
    assert_eq!(
        engine.evaluate(&paid, T0 + 10 * DAY).unwrap().state,
        EntitlementState::Subscribed
    );
}

#[test]
fn gate_and_admin_over_sqlite() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(open(&dir));
    let clock = Arc::new(ManualClock::new(T0));
    let gate = AccessGate::new(engine.clone(), clock.clone());
    let admin = AdminConsole::new(engine.clone(), clock.clone());

    let a = UserId::from("a");
    let b = UserId::from("b");
    assert!(gate.check(&a).allowed);
    assert!(gate.check(&b).allowed);

    clock.set(T0 + 500);
    admin.force_expire(&a).unwrap();
    assert!(!gate.is_entitled(&a));
    assert!(gate.is_entitled(&b));
    assert_eq!(gate.remaining_millis(&b), DAY - 500);
}

#[test]
fn corrupt_row_is_treated_as_absent_and_overwritten() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(open(&dir));
    engine
        .store()
        .with_connection(|conn| {
            conn.execute(
                "INSERT INTO entitlement_records (user_id, record, updated_at) VALUES ('x', '[1,2]', 0)",
                [],
            )
            .map_err(|e| entitlement_core::StoreError::backend(e.to_string()))?;
            Ok(())
        })
        .unwrap();

    let u = UserId::from("x");
    assert!(engine.record(&u).unwrap().is_none());

    let gate = AccessGate::new(engine.clone(), Arc::new(ManualClock::new(T0)));
    let decision = gate.check(&u);
    assert!(decision.allowed);
    assert!(engine.store().get(&u).unwrap().is_some());
}

#[test]
fn from_config_opens_configured_path() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("configured.db");
    let config = entitlement_core::EntitlementConfig::from_toml(&format!(
        "[storage]\ndb_path = \"{}\"\n",
        db.display().to_string().replace('\\', "\\\\")
    ))
    .unwrap();

    let u = UserId::from("student");
    {
        let store = SqliteEntitlementStore::from_config(&config.storage).unwrap();
        assert_eq!(store.path(), Some(db.as_path()));
        EntitlementEngine::new(store).purchase(&u, "sem-1", T0).unwrap();
    }
    assert!(db.exists());

    let reopened = SqliteEntitlementStore::open(&db).unwrap();
    assert!(reopened.get(&u).unwrap().unwrap().has_subscription);
}

#[test]
fn from_config_without_path_is_in_memory() {
    let config = entitlement_core::EntitlementConfig::default();
    let store = SqliteEntitlementStore::from_config(&config.storage).unwrap();
    assert!(store.path().is_none());
    assert_eq!(store.record_count().unwrap(), 0);
}
