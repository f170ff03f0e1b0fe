// tests/history_store.rs
use job_hunt::history::{History, HistoryStore};
use job_hunt::CanonicalLink;
use std::fs;

#[test]
fn missing_file_is_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path().join("history.json"));
    assert_eq!(store.load().unwrap(), History::default());
}

#[test]
fn save_then_load_keeps_links_and_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.json");
    let store = HistoryStore::new(&path);

    let mut h = History::default();
    h.record_seen([CanonicalLink::from("https://a.test/1?utm=x")]);
    h.record_applied([CanonicalLink::from("https://a.test/1")]);
    store.save(&h).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["seen_links"][0], "https://a.test/1");
    assert_eq!(raw["applied_links"][0], "https://a.test/1");
    assert_eq!(store.load().unwrap(), h);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn partial_document_defaults_missing_lists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, r#"{"seen_links": ["https://a.test/9"]}"#).unwrap();
    let h = HistoryStore::new(&path).load().unwrap();
    assert_eq!(h.seen_links, vec!["https://a.test/9".to_string()]);
    assert!(h.applied_links.is_empty());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, "{not json").unwrap();
    let err = HistoryStore::new(&path).load().unwrap_err();
    assert!(format!("{err:#}").contains("parsing history"));
}
