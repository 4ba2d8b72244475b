//! Tests for runcoach-journal: load/save contract, corruption recovery, lost updates

use runcoach_core::{LogEntry, UserId};
use runcoach_journal::*;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn journal_in(dir: &TempDir) -> Journal {
    Journal::open(dir.path().join("user_data.json"))
}

fn sample_store() -> JournalStore {
    let mut store = JournalStore::new();
    store.append(&UserId::new("111"), LogEntry::new("2024-05-01", 5));
    store.append(&UserId::new("111"), LogEntry::new("2024-04-28", 12.5));
    store.append(&UserId::new("222"), LogEntry::new("2024-05-02", "7"));
    store.append(&UserId::new("333"), LogEntry::new(serde_json::Value::Null, serde_json::Value::Null));
    store
}

// ===========================================================================
// load
// ===========================================================================

#[tokio::test]
async fn load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    assert_eq!(journal.load().await, JournalStore::default());
}

#[tokio::test]
async fn load_empty_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    fs::write(journal.path(), "").unwrap();
    assert!(journal.load().await.is_empty());
    fs::write(journal.path(), "  \n\t ").unwrap();
    assert!(journal.load().await.is_empty());
}

#[tokio::test]
async fn load_malformed_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    fs::write(journal.path(), r#"{"111": [{"date": "2024-05-01", "#).unwrap();
    assert!(journal.load().await.is_empty());
}

#[tokio::test]
async fn load_wrong_shape_is_empty() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    fs::write(journal.path(), r#"[1, 2, 3]"#).unwrap();
    assert!(journal.load().await.is_empty());
    fs::write(journal.path(), r#"{"111": "not a list"}"#).unwrap();
    assert!(journal.load().await.is_empty());
}

#[tokio::test]
async fn load_reads_document_written_by_hand() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    fs::write(
        journal.path(),
        r#"{
  "111": [
    {"date": "2024-05-01", "distance_km": 5},
    {"date": "2024-05-02", "distance_km": "10"}
  ]
}"#,
    )
    .unwrap();
    let store = journal.load().await;
    let log = store.entries(&UserId::new("111"));
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], LogEntry::new("2024-05-01", 5));
    assert_eq!(log[1].distance_km, "10");
}

// ===========================================================================
// save
// ===========================================================================

#[tokio::test]
async fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    let store = sample_store();
    journal.save(&store).await.unwrap();
    assert_eq!(journal.load().await, store);
}

#[tokio::test]
async fn save_empty_round_trips() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    journal.save(&JournalStore::default()).await.unwrap();
    assert_eq!(fs::read_to_string(journal.path()).unwrap(), "{}");
    assert!(journal.load().await.is_empty());
}

#[tokio::test]
async fn save_overwrites_corrupt_document() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    fs::write(journal.path(), "garbage").unwrap();
    let store = sample_store();
    journal.save(&store).await.unwrap();
    assert_eq!(journal.load().await, store);
}

#[tokio::test]
async fn save_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    journal.save(&sample_store()).await.unwrap();
    journal.save(&sample_store()).await.unwrap();
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["user_data.json".to_string()]);
}

#[tokio::test]
async fn save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::open(dir.path().join("nested/deeper/user_data.json"));
    journal.save(&sample_store()).await.unwrap();
    assert_eq!(journal.load().await, sample_store());
}

#[tokio::test]
async fn save_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let journal = Journal::open(blocker.join("user_data.json"));
    let err = journal.save(&sample_store()).await.unwrap_err();
    assert!(matches!(err, JournalError::Io { .. }));
    assert!(err.to_string().contains("not-a-dir"));
}

#[tokio::test]
async fn saved_document_is_pretty_json_object() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    let mut store = JournalStore::new();
    store.append(&UserId::new("1"), LogEntry::new("2024-05-01", 5));
    journal.save(&store).await.unwrap();
    let raw = fs::read_to_string(journal.path()).unwrap();
    assert!(raw.contains("\n  \"1\": ["));
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({"1": [{"date": "2024-05-01", "distance_km": 5}]}));
}

// ===========================================================================
// Lost updates
// ===========================================================================

#[tokio::test]
async fn raw_load_save_interleaving_loses_an_update() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    let user = UserId::new("111");

    // Both handlers read the same snapshot before either writes.
    let mut first = journal.load().await;
    let mut second = journal.load().await;

    first.append(&user, LogEntry::new("2024-05-01", 5));
    second.append(&user, LogEntry::new("2024-05-02", 8));

    journal.save(&first).await.unwrap();
    journal.save(&second).await.unwrap();

    let log = journal.entries(&user).await;
    assert_eq!(log, vec![LogEntry::new("2024-05-02", 8)]);
}

#[tokio::test]
async fn concurrent_appends_keep_every_entry() {
    let dir = TempDir::new().unwrap();
    let journal = Arc::new(journal_in(&dir));
    let same_user = UserId::new("111");

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let journal = journal.clone();
            let user = if i % 4 == 0 { UserId::new("222") } else { same_user.clone() };
            tokio::spawn(async move {
                journal
                    .append(&user, LogEntry::new("2024-05-01", i))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }

    let stats = journal.stats().await;
    assert_eq!(stats, JournalStats { users: 2, entries: 16 });
    assert_eq!(journal.entries(&same_user).await.len(), 12);
}

#[tokio::test]
async fn append_returns_log_length() {
    let dir = TempDir::new().unwrap();
    let journal = journal_in(&dir);
    let user = UserId::new("111");
    assert_eq!(journal.append(&user, LogEntry::new("2024-05-01", 5)).await.unwrap(), 1);
    assert_eq!(journal.append(&user, LogEntry::new("2024-05-02", 6)).await.unwrap(), 2);
    assert_eq!(
        journal.entries(&user).await,
        vec![LogEntry::new("2024-05-01", 5), LogEntry::new("2024-05-02", 6)]
    );
}

#[tokio::test]
async fn append_failure_leaves_document_untouched() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let journal = Journal::open(blocker.join("user_data.json"));
    let user = UserId::new("111");
    assert!(journal.append(&user, LogEntry::new("2024-05-01", 5)).await.is_err());
    assert!(journal.entries(&user).await.is_empty());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "file in the way");
}
