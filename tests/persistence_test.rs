// Restart round-trips: history written by one store instance is restored by the next
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clip_history::db::{SqliteStore, DB_FILE_NAME};
use clip_history::history::{HistoryStore, MAX_HISTORY};
use clip_history::persistence::{HistoryPersistence, JsonFileStore, HISTORY_KEY};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock error")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("clip-history-{tag}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn fill(store: &HistoryStore) {
    for i in 0..(MAX_HISTORY + 3) {
        store.insert_or_promote(format!("item-{i}"));
    }
    store.promote(4);
}

#[test]
fn sqlite_history_survives_restart() {
    let dir = unique_temp_dir("sqlite");
    let db_path = dir.join(DB_FILE_NAME);

    let expected = {
        let store = HistoryStore::load(Arc::new(SqliteStore::open(&db_path).expect("open db")));
        fill(&store);
        store.list()
    };
    assert_eq!(expected.len(), MAX_HISTORY);
    assert_eq!(expected[0], "item-8");

    let restored = HistoryStore::load(Arc::new(SqliteStore::open(&db_path).expect("reopen db")));
    assert_eq!(restored.list(), expected);
    assert!(!restored.persistence_degraded());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn json_history_survives_restart() {
    let dir = unique_temp_dir("json");

    let expected = {
        let store = HistoryStore::load(Arc::new(JsonFileStore::open(&dir).expect("open json store")));
        fill(&store);
        store.list()
    };

    let restored = HistoryStore::load(Arc::new(JsonFileStore::open(&dir).expect("reopen json store")));
    assert_eq!(restored.list(), expected);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn cleared_history_restores_empty() {
    let dir = unique_temp_dir("cleared");
    let db_path = dir.join(DB_FILE_NAME);

    {
        let store = HistoryStore::load(Arc::new(SqliteStore::open(&db_path).expect("open db")));
        fill(&store);
        store.clear();
    }

    let restored = HistoryStore::load(Arc::new(SqliteStore::open(&db_path).expect("reopen db")));
    assert!(restored.is_empty());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn hand_edited_record_is_sanitized_on_load() {
    let dir = unique_temp_dir("sanitize");
    let persistence = Arc::new(JsonFileStore::open(&dir).expect("open json store"));

    let mut saved: Vec<String> = vec!["dup".into(), "".into(), "dup".into()];
    saved.extend((0..15).map(|i| format!("extra-{i}")));
    persistence.save(HISTORY_KEY, &saved).expect("seed record");

    let store = HistoryStore::load(persistence);
    let items = store.list();
    assert_eq!(items.len(), MAX_HISTORY);
    assert_eq!(items[0], "dup");
    assert_eq!(items[1], "extra-0");
    assert!(items.iter().all(|item| !item.is_empty()));

    let _ = std::fs::remove_dir_all(dir);
}
