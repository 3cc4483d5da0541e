use std::fs;

use chrono::{Duration, TimeZone, Utc};
use huarongdao_catalog::{list_custom_levels, load_custom_level, CustomLevelStore};
use huarongdao_core::{CellCoord, Completion, CustomLevelId, LevelKey, Piece, PieceKind};
use huarongdao_storage::{
    BestRecord, CustomLevelDraft, FileStore, KeyValueStore, MemoryStore, Storage,
    CUSTOM_LEVELS_KEY, RECORDS_KEY,
};
use tempfile::TempDir;

fn draft(name: &str) -> CustomLevelDraft {
    CustomLevelDraft {
        name: name.to_owned(),
        description: String::from("test layout"),
        pieces: vec![
            Piece::new("C", PieceKind::Protagonist, CellCoord::new(1, 0)),
            Piece::new("P1", PieceKind::Soldier, CellCoord::new(0, 4)),
        ],
    }
}

#[test]
fn first_result_creates_a_record() {
    let mut storage = Storage::new(MemoryStore::new());
    let key = LevelKey::BuiltIn(1);

    assert!(storage.update_record(&key, 12, 80).expect("update succeeds"));
    assert_eq!(
        storage.record(&key).expect("read succeeds"),
        Some(BestRecord {
            best_moves: Some(12),
            best_time: Some(80),
        })
    );
}

#[test]
fn records_improve_field_by_field() {
    let mut storage = Storage::new(MemoryStore::new());
    let key = LevelKey::BuiltIn(2);
    assert!(storage.update_record(&key, 10, 60).expect("update succeeds"));

    assert!(storage.update_record(&key, 8, 70).expect("update succeeds"));
    assert_eq!(
        storage.record(&key).expect("read succeeds"),
        Some(BestRecord {
            best_moves: Some(8),
            best_time: Some(60),
        }),
        "fewer moves replace the count while the faster time stays",
    );

    assert!(
        !storage.update_record(&key, 12, 80).expect("update succeeds"),
        "a worse result changes nothing"
    );
    assert_eq!(
        storage.record(&key).expect("read succeeds"),
        Some(BestRecord {
            best_moves: Some(8),
            best_time: Some(60),
        })
    );
}

#[test]
fn completions_are_recorded_under_their_key() {
    let mut storage = Storage::new(MemoryStore::new());
    let completion = Completion {
        key: LevelKey::Custom(CustomLevelId::new("abc")),
        moves: 4,
        elapsed_seconds: 9,
    };

    assert!(storage.record_completion(&completion).expect("update succeeds"));

    let records = storage.records().expect("read succeeds");
    assert!(records.contains_key("custom_abc"));
}

#[test]
fn clearing_records_forgets_everything() {
    let mut storage = Storage::new(MemoryStore::new());
    let _ = storage.update_record(&LevelKey::BuiltIn(1), 5, 5).expect("update succeeds");

    storage.clear_records().expect("clear succeeds");

    assert!(storage.records().expect("read succeeds").is_empty());
}

#[test]
fn corrupt_values_fall_back_to_defaults() {
    let mut backend = MemoryStore::new();
    backend.set(RECORDS_KEY, "{not json").expect("set succeeds");
    backend
        .set(CUSTOM_LEVELS_KEY, r#"{"unexpected":"shape"}"#)
        .expect("set succeeds");
    let mut storage = Storage::new(backend);

    assert!(storage.records().expect("corruption is recovered").is_empty());
    assert!(storage.custom_levels().is_empty());

    assert!(storage
        .update_record(&LevelKey::BuiltIn(1), 7, 30)
        .expect("update succeeds"));
    assert_eq!(storage.records().expect("read succeeds").len(), 1);
}

#[test]
fn one_corrupt_level_does_not_hide_the_others() {
    let mut storage = Storage::new(MemoryStore::new());
    let now = Utc::now();
    let good = storage
        .save_custom_level(&CustomLevelId::new("good"), draft("kept"), now)
        .expect("save succeeds");

    let mut rows: Vec<serde_json::Value> = serde_json::from_str(
        &storage
            .backend()
            .get(CUSTOM_LEVELS_KEY)
            .expect("read succeeds")
            .expect("table stored"),
    )
    .expect("table is a list");
    let mut bad = rows[0].clone();
    bad["id"] = serde_json::json!("bad");
    bad["pieces"][0]["width"] = serde_json::json!(1);
    rows.push(bad);
    let mut backend = MemoryStore::new();
    backend
        .set(CUSTOM_LEVELS_KEY, &serde_json::to_string(&rows).expect("encodes"))
        .expect("set succeeds");
    let mut storage = Storage::new(backend);

    let visible = storage.load_custom_levels().expect("read succeeds");
    assert_eq!(visible, vec![good]);

    let _ = storage
        .save_custom_level(&CustomLevelId::new("new"), draft("added"), now)
        .expect("save succeeds");

    let ids: Vec<String> = storage
        .load_custom_levels()
        .expect("read succeeds")
        .into_iter()
        .map(|level| level.id.to_string())
        .collect();
    assert_eq!(ids, ["good", "new"]);
}

#[test]
fn saving_upserts_and_preserves_creation_time() {
    let mut storage = Storage::new(MemoryStore::new());
    let id = CustomLevelId::new("1700000000000_abcdefghi");
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).single().expect("valid date");
    let edited = created + Duration::hours(2);

    let first = storage
        .save_custom_level(&id, draft("first"), created)
        .expect("save succeeds");
    assert_eq!(first.created_at, created);

    let second = storage
        .save_custom_level(&id, draft("renamed"), edited)
        .expect("save succeeds");
    assert_eq!(second.created_at, created);
    assert_eq!(second.updated_at, edited);

    let levels = storage.load_custom_levels().expect("read succeeds");
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].name, "renamed");
}

#[test]
fn custom_levels_keep_save_order() {
    let mut storage = Storage::new(MemoryStore::new());
    let now = Utc::now();
    for name in ["a", "b", "c"] {
        let _ = storage
            .save_custom_level(&CustomLevelId::new(name), draft(name), now)
            .expect("save succeeds");
    }

    let names: Vec<String> = list_custom_levels(&storage)
        .into_iter()
        .map(|summary| summary.name)
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn deleting_a_level_drops_its_record() {
    let mut storage = Storage::new(MemoryStore::new());
    let id = CustomLevelId::new("gone");
    let key = LevelKey::Custom(id.clone());
    let _ = storage
        .save_custom_level(&id, draft("doomed"), Utc::now())
        .expect("save succeeds");
    let _ = storage.update_record(&key, 3, 3).expect("update succeeds");
    let _ = storage
        .update_record(&LevelKey::BuiltIn(1), 9, 9)
        .expect("update succeeds");

    assert!(storage.delete_custom_level(&id).expect("delete succeeds"));
    assert!(!storage.delete_custom_level(&id).expect("delete succeeds"));

    assert!(load_custom_level(&storage, &id).is_none());
    assert_eq!(storage.record(&key).expect("read succeeds"), None);
    assert!(storage
        .record(&LevelKey::BuiltIn(1))
        .expect("read succeeds")
        .is_some());
}

#[test]
fn file_store_persists_across_instances() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let id = CustomLevelId::new("disk");

    {
        let mut storage = Storage::new(FileStore::new(dir.path()));
        let _ = storage
            .save_custom_level(&id, draft("on disk"), Utc::now())
            .expect("save succeeds");
        let _ = storage
            .update_record(&LevelKey::BuiltIn(3), 120, 600)
            .expect("update succeeds");
    }

    let storage = Storage::new(FileStore::new(dir.path()));
    let level = load_custom_level(&storage, &id).expect("level survives reopening");
    assert_eq!(level.name(), "on disk");
    assert_eq!(level.board().len(), 2);
    assert!(storage.backend().path_for(RECORDS_KEY).exists());
}

#[test]
fn file_store_reports_missing_keys_as_absent() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut store = FileStore::new(dir.path().join("nested"));

    assert_eq!(store.get("anything").expect("read succeeds"), None);
    store.remove("anything").expect("removing a missing key is fine");

    store.set("anything", "42").expect("set creates the directory");
    assert_eq!(store.get("anything").expect("read succeeds").as_deref(), Some("42"));
}

#[test]
fn corrupt_file_is_recovered() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::new(dir.path());
    fs::write(store.path_for(CUSTOM_LEVELS_KEY), "[{]").expect("Write failed");

    let storage = Storage::new(store);

    assert!(storage.load_custom_levels().expect("recovered").is_empty());
}
