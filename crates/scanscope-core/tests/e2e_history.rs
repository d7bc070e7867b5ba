/// End-to-end tests for the scan ledger on a real filesystem.
///
/// Each test works in its own `TempDir`, so they are isolated and leave
/// nothing behind.
use scanscope_core::engine::SessionId;
use scanscope_core::history::{HistoryEntry, HistoryLedger, JsonFileStore, HISTORY_FILE_NAME};
use scanscope_core::settings::Settings;
use std::fs;
use tempfile::TempDir;

fn entry(id: u64, root: &str) -> HistoryEntry {
    HistoryEntry {
        id: SessionId(id),
        root_path: root.to_string(),
        scanned_files: id * 10,
        scanned_bytes: id * 1_024,
        duration_ms: 250,
        finished_at: 1_700_000_000_000 + id as i64,
    }
}

fn ledger(dir: &TempDir, capacity: usize) -> HistoryLedger {
    let mut ledger = HistoryLedger::new(Box::new(JsonFileStore::in_dir(dir.path())), capacity);
    ledger.load();
    ledger
}

#[test]
fn missing_file_loads_empty() {
    let tmp = TempDir::new().unwrap();
    let ledger = ledger(&tmp, 6);
    assert!(ledger.is_loaded());
    assert!(ledger.is_empty());
    assert!(!tmp.path().join(HISTORY_FILE_NAME).exists());
}

#[test]
fn records_persist_newest_first() {
    let tmp = TempDir::new().unwrap();
    {
        let mut ledger = ledger(&tmp, 6);
        assert!(ledger.record(entry(1, "/a")));
        assert!(ledger.record(entry(2, "/b")));
    }
    let reloaded = ledger(&tmp, 6);
    let ids: Vec<u64> = reloaded.entries().iter().map(|e| e.id.0).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(reloaded.entries()[1], entry(1, "/a"));

    let raw = fs::read_to_string(tmp.path().join(HISTORY_FILE_NAME)).unwrap();
    assert!(raw.contains("\"rootPath\""), "ledger is not camelCase: {raw}");
    assert!(!tmp.path().join("scan-history.tmp").exists());
}

#[test]
fn smaller_capacity_truncates_on_load() {
    let tmp = TempDir::new().unwrap();
    {
        let mut ledger = ledger(&tmp, 6);
        for id in 1..=5 {
            ledger.record(entry(id, "/data"));
        }
    }
    let reloaded = ledger(&tmp, 2);
    let ids: Vec<u64> = reloaded.entries().iter().map(|e| e.id.0).collect();
    assert_eq!(ids, vec![5, 4]);
}

#[test]
fn corrupt_file_loads_empty_and_is_replaced_on_next_record() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(HISTORY_FILE_NAME), "{ not json").unwrap();

    let mut ledger = ledger(&tmp, 6);
    assert!(ledger.is_empty());
    ledger.record(entry(9, "/z"));

    let reloaded = self::ledger(&tmp, 6);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.entries()[0].id, SessionId(9));
}

#[test]
fn store_creates_missing_data_directory() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("deep").join("data");
    let mut ledger = HistoryLedger::new(Box::new(JsonFileStore::in_dir(&nested)), 6);
    ledger.load();
    ledger.record(entry(1, "/a"));
    assert!(nested.join(HISTORY_FILE_NAME).exists());
}

#[test]
fn settings_data_dir_points_the_store() {
    let tmp = TempDir::new().unwrap();
    let settings_file = tmp.path().join("settings.json");
    fs::write(
        &settings_file,
        format!(
            r#"{{ "history_capacity": 3, "data_dir": {:?} }}"#,
            tmp.path().join("ledger").display().to_string()
        ),
    )
    .unwrap();

    let settings = Settings::load_or_init_at(&settings_file).unwrap();
    let dir = settings.data_dir.clone().unwrap();
    assert_eq!(settings.history_capacity, 3);
    let mut ledger = HistoryLedger::new(
        Box::new(JsonFileStore::in_dir(&dir)),
        settings.history_capacity,
    );
    ledger.load();
    ledger.record(entry(1, "/a"));
    assert!(tmp.path().join("ledger").join(HISTORY_FILE_NAME).exists());
}
