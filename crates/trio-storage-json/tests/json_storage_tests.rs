use std::{fs, sync::Arc};

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::tempdir;
use trio_core::{BudgetSession, DocumentKey, DocumentStore, FixedClock};
use trio_domain::{AllocationPolicy, EntryCategory, GoalDraft, GoalTransactionKind};
use trio_storage_json::JsonDocumentStore;

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
    ))
}

#[test]
fn json_store_reads_back_written_documents() {
    let dir = tempdir().expect("tempdir");
    let store = JsonDocumentStore::new(dir.path().join("data")).expect("create store");

    assert!(store.read(DocumentKey::Goals).expect("read").is_none());
    store
        .write(DocumentKey::Goals, "[]")
        .expect("write goals");
    assert_eq!(store.read(DocumentKey::Goals).unwrap().as_deref(), Some("[]"));

    let path = store.document_path(DocumentKey::Goals);
    assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("wantsBudgets.json"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn overwrites_keep_limited_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonDocumentStore::with_retention(dir.path().to_path_buf(), 3).expect("store");

    for version in 0..6 {
        store
            .write(DocumentKey::AllocationPolicy, &format!("{{\"version\":{version}}}"))
            .expect("write");
    }
    let backups = store
        .list_backups(DocumentKey::AllocationPolicy)
        .expect("list backups");
    assert_eq!(backups.len(), 3);
    assert!(backups.iter().all(|info| info.created_at.is_some()));
    assert!(store.list_backups(DocumentKey::Goals).unwrap().is_empty());

    let newest = fs::read_to_string(&backups[0].path).expect("read backup");
    assert_eq!(newest, "{\"version\":4}");
}

#[test]
fn restoring_a_backup_replaces_the_document() {
    let dir = tempdir().expect("tempdir");
    let store = JsonDocumentStore::new(dir.path().to_path_buf()).expect("store");
    store
        .write(DocumentKey::AllocationPolicy, r#"{"needs":50,"wants":30,"dream":20}"#)
        .unwrap();
    store
        .write(DocumentKey::AllocationPolicy, r#"{"needs":40,"wants":40,"dream":20}"#)
        .unwrap();

    let backup = store
        .list_backups(DocumentKey::AllocationPolicy)
        .unwrap()
        .into_iter()
        .next()
        .expect("one backup");
    let found = store
        .find_backup(DocumentKey::AllocationPolicy, &backup.id)
        .expect("find backup");
    store.restore_backup(&found).expect("restore");

    let live = store.read(DocumentKey::AllocationPolicy).unwrap().unwrap();
    assert_eq!(live, r#"{"needs":50,"wants":30,"dream":20}"#);
    assert_eq!(store.list_backups(DocumentKey::AllocationPolicy).unwrap().len(), 2);
    assert!(store.find_backup(DocumentKey::Goals, "missing.json").is_err());
}

#[test]
fn session_state_survives_reopen_from_disk() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("home");
    let goal_id;
    let snapshot;
    {
        let store = Arc::new(JsonDocumentStore::new(root.clone()).expect("store"));
        let mut session =
            BudgetSession::open(store, clock(), AllocationPolicy::default()).expect("open");
        session.add_entry(EntryCategory::Income, "", 1000.0).unwrap();
        session.add_entry(EntryCategory::Essentials, "rent", 300.0).unwrap();
        goal_id = session
            .create_goal(GoalDraft::new(
                "Trip",
                1000.0,
                0.0,
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            ))
            .unwrap()
            .id;
        session
            .add_goal_transaction(goal_id, GoalTransactionKind::RecurringContribution, "Jan", 100.0)
            .unwrap();
        snapshot = session.state().clone();
    }

    let store = Arc::new(JsonDocumentStore::new(root.clone()).expect("store"));
    let session = BudgetSession::open(store, clock(), AllocationPolicy::default()).expect("reopen");
    assert_eq!(session.state(), &snapshot);
    assert_eq!(session.goal(goal_id).unwrap().base_savings, 100.0);

    let raw = fs::read_to_string(root.join("monthlyRecords.json")).unwrap();
    let months: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let twin_id = session.goal(goal_id).unwrap().transactions[0].id;
    assert_eq!(months["2024-01"]["wantsExpenses"][0]["id"], twin_id);
}
