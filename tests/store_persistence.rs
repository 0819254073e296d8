use chronosense::results::{Attempt, FileBackend, ResultsStore};
use tempfile::tempdir;

fn file_store(path: &std::path::Path) -> ResultsStore {
    ResultsStore::with_backend(Box::new(FileBackend::with_path(path)))
}

#[test]
fn fresh_store_with_no_blob_is_empty() {
    let dir = tempdir().unwrap();
    let store = file_store(&dir.path().join("results.json"));
    assert!(store.attempts().is_empty());
}

#[test]
fn attempts_survive_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut store = file_store(&path);
    store.add_result(10, 9.87);
    store.add_result(30, 31.02);
    let before = store.attempts().to_vec();
    drop(store);

    // A fresh store instance reads the same blob back, field for field.
    let reloaded = file_store(&path);
    assert_eq!(reloaded.attempts(), before.as_slice());

    let attempts = reloaded.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].target_secs, Some(10));
    assert_eq!(attempts[0].actual_secs, 9.87);
    assert_eq!(attempts[1].target_secs, Some(30));
    assert_eq!(attempts[1].actual_secs, 31.02);
}

#[test]
fn garbage_blob_loads_as_empty_without_panicking() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    std::fs::write(&path, b"\xff\xfenot even close to json").unwrap();

    let store = file_store(&path);
    assert!(store.attempts().is_empty());
}

#[test]
fn reset_all_persists_the_empty_collection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut store = file_store(&path);
    store.add_result(15, 16.2);
    store.add_result(20, 18.9);
    store.reset_all();
    assert!(store.attempts().is_empty());
    drop(store);

    let reloaded = file_store(&path);
    assert!(reloaded.attempts().is_empty());
}

#[test]
fn legacy_blob_loads_and_survives_later_appends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    // Blob written by the old schema: measured time only, no target.
    std::fs::write(
        &path,
        r#"[
            {
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "timestamp": "2024-11-02T09:15:30.120000+01:00",
                "time": 12.34
            }
        ]"#,
    )
    .unwrap();

    let mut store = file_store(&path);
    assert_eq!(store.attempts().len(), 1);
    assert_eq!(store.attempts()[0].target_secs, None);
    assert_eq!(store.attempts()[0].actual_secs, 12.34);

    // Appending re-serializes the whole collection; the legacy record must
    // come back intact after another reload.
    store.add_result(25, 24.01);
    let before = store.attempts().to_vec();
    drop(store);

    let reloaded = file_store(&path);
    assert_eq!(reloaded.attempts(), before.as_slice());
    assert_eq!(reloaded.attempts()[0].target_secs, None);
    assert_eq!(reloaded.attempts()[1].target_secs, Some(25));

    // And the legacy record is still written in legacy form on disk.
    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json[0].get("time").is_some());
    assert!(json[0].get("targetSeconds").is_none());
    assert!(json[1].get("targetSeconds").is_some());
}

#[test]
fn ids_stay_unique_across_restarts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut store = file_store(&path);
    for i in 0..5 {
        store.add_result(5, 5.0 + i as f64 / 10.0);
    }
    drop(store);

    let mut store = file_store(&path);
    for i in 0..5 {
        store.add_result(10, 10.0 + i as f64 / 10.0);
    }

    let ids: std::collections::HashSet<_> = store.attempts().iter().map(|a| a.id).collect();
    assert_eq!(ids.len(), 10);

    // insertion order preserved: all 5s targets before all 10s targets
    let targets: Vec<_> = store
        .attempts()
        .iter()
        .map(|a| a.target_secs.unwrap())
        .collect();
    assert_eq!(targets, vec![5, 5, 5, 5, 5, 10, 10, 10, 10, 10]);
}

#[test]
fn write_failure_keeps_the_attempt_in_memory() {
    let dir = tempdir().unwrap();

    // Parent "directory" of the blob is a regular file, so every write fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let path = blocker.join("results.json");

    let mut store = file_store(&path);
    store.add_result(20, 19.3);

    assert_eq!(store.attempts().len(), 1);
    assert_eq!(store.attempts()[0].target_secs, Some(20));
    assert_eq!(store.attempts()[0].actual_secs, 19.3);
}

#[test]
fn timestamps_round_trip_to_persisted_precision() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");

    let mut store = file_store(&path);
    store.add_result(10, 9.87);
    let original: Attempt = store.attempts()[0].clone();
    drop(store);

    let reloaded = file_store(&path);
    let restored = &reloaded.attempts()[0];
    assert_eq!(restored.id, original.id);
    assert_eq!(restored.timestamp, original.timestamp);
    assert_eq!(restored.target_secs, original.target_secs);
    assert_eq!(restored.actual_secs, original.actual_secs);
}
