use std::time::Duration;

use super::*;

fn memory_store() -> (Arc<MemoryStorage>, IntentStore) {
    let storage = Arc::new(MemoryStorage::new());
    let store = IntentStore::new(Arc::clone(&storage) as Arc<dyn IntentStorage>);
    (storage, store)
}

#[test]
fn address_intent_round_trips() {
    let (_, store) = memory_store();
    let intent = LocateIntent::Address {
        address: "69007 Lyon".to_owned(),
    };
    store.set(&intent).unwrap();
    assert_eq!(store.take(), Some(intent));
}

#[test]
fn take_consumes_exactly_once() {
    let (storage, store) = memory_store();
    store.set(&LocateIntent::Geolocate).unwrap();
    assert_eq!(store.take(), Some(LocateIntent::Geolocate));
    assert_eq!(store.take(), None);
    assert_eq!(storage.get(INTENT_KEY).unwrap(), None);
}

#[test]
fn set_overwrites_pending_intent() {
    let (_, store) = memory_store();
    store.set(&LocateIntent::Geolocate).unwrap();
    store
        .set(&LocateIntent::Address {
            address: "Nantes".to_owned(),
        })
        .unwrap();
    assert_eq!(
        store.take(),
        Some(LocateIntent::Address {
            address: "Nantes".to_owned()
        })
    );
}

#[test]
fn dropped_claim_keeps_intent() {
    let (_, store) = memory_store();
    store.set(&LocateIntent::Geolocate).unwrap();
    {
        let claim = store.claim().expect("intent pending");
        assert_eq!(claim.intent(), &LocateIntent::Geolocate);
    }
    assert_eq!(store.take(), Some(LocateIntent::Geolocate));
}

#[test]
fn malformed_json_is_absent_and_cleared() {
    let (storage, store) = memory_store();
    storage.set(INTENT_KEY, "{\"type\":\"address\",").unwrap();
    assert_eq!(store.take(), None);
    assert_eq!(storage.get(INTENT_KEY).unwrap(), None);
}

#[test]
fn unknown_type_is_absent_and_cleared() {
    let (storage, store) = memory_store();
    storage.set(INTENT_KEY, r#"{"type":"teleport"}"#).unwrap();
    assert_eq!(store.take(), None);
    assert_eq!(storage.get(INTENT_KEY).unwrap(), None);
}

#[test]
fn legacy_record_without_timestamp_is_accepted() {
    let (storage, store) = memory_store();
    let store = store.with_max_age(Duration::from_secs(60));
    storage
        .set(INTENT_KEY, r#"{"type":"address","address":"Lyon"}"#)
        .unwrap();
    assert_eq!(
        store.take(),
        Some(LocateIntent::Address {
            address: "Lyon".to_owned()
        })
    );
}

#[test]
fn expired_record_is_absent_and_cleared() {
    let (storage, store) = memory_store();
    let store = store.with_max_age(Duration::from_secs(60));
    storage
        .set(
            INTENT_KEY,
            r#"{"type":"geolocate","created_at":"2020-01-01T00:00:00Z"}"#,
        )
        .unwrap();
    assert_eq!(store.take(), None);
    assert_eq!(storage.get(INTENT_KEY).unwrap(), None);
}

#[test]
fn old_record_without_max_age_is_kept() {
    let (storage, store) = memory_store();
    storage
        .set(
            INTENT_KEY,
            r#"{"type":"geolocate","created_at":"2020-01-01T00:00:00Z"}"#,
        )
        .unwrap();
    assert_eq!(store.take(), Some(LocateIntent::Geolocate));
}

#[test]
fn persisted_layout_uses_type_tag() {
    let (storage, store) = memory_store();
    store
        .set(&LocateIntent::Address {
            address: "Lyon".to_owned(),
        })
        .unwrap();
    let raw = storage.get(INTENT_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["type"], "address");
    assert_eq!(value["address"], "Lyon");
    assert!(value["created_at"].is_string());

    store.set(&LocateIntent::Geolocate).unwrap();
    let raw = storage.get(INTENT_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["type"], "geolocate");
    assert!(value.get("address").is_none());
}

#[test]
fn file_storage_survives_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    let first = IntentStore::new(Arc::new(FileStorage::new(dir.path())));
    first
        .set(&LocateIntent::Address {
            address: "44000".to_owned(),
        })
        .unwrap();

    // A fresh store over the same directory stands in for the next page load.
    let second = IntentStore::new(Arc::new(FileStorage::new(dir.path())));
    assert_eq!(
        second.take(),
        Some(LocateIntent::Address {
            address: "44000".to_owned()
        })
    );
    assert_eq!(second.take(), None);
}

#[test]
fn file_storage_missing_directory_reads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("not-created-yet"));
    assert_eq!(storage.get(INTENT_KEY).unwrap(), None);
    storage.remove(INTENT_KEY).unwrap();
}

#[test]
fn file_storage_malformed_file_is_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    storage.set(INTENT_KEY, "not json").unwrap();
    let store = IntentStore::new(Arc::clone(&storage) as Arc<dyn IntentStorage>);
    assert_eq!(store.take(), None);
    assert!(!dir.path().join(format!("{INTENT_KEY}.json")).exists());
}
