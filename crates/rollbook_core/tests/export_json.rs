use rollbook_core::db::open_db_in_memory;
use rollbook_core::{
    export_to, load_export, ExportError, NewStudent, SqliteStudentRepository, StudentRepository,
};
use serde_json::Value;

fn seeded_records() -> Vec<rollbook_core::StudentRecord> {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    for student in [
        NewStudent::new("Alice", 20, "A", 91.5, "Beijing"),
        NewStudent::new("李雷", 21, "B", 0.1 + 0.2, "上海"),
        NewStudent::new("Cara", 20, "A", 88.0, "Beijing"),
    ] {
        repo.insert(&student).unwrap();
    }
    repo.list_all().unwrap()
}

#[test]
fn export_then_reimport_preserves_fields_order_and_score_bits() {
    let records = seeded_records();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.json");

    let written = export_to(&path, &records).unwrap();
    assert_eq!(written, 3);

    let loaded = load_export(&path).unwrap();
    assert_eq!(loaded, records);
    for (original, reloaded) in records.iter().zip(&loaded) {
        assert_eq!(original.score.to_bits(), reloaded.score.to_bits());
    }
}

#[test]
fn export_uses_ordered_keys_two_space_indent_and_literal_unicode() {
    let records = seeded_records();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.json");
    export_to(&path, &records).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n  {\n    \"id\": "));
    assert!(text.contains("\"李雷\""));
    assert!(text.contains("\"上海\""));
    assert!(!text.contains("\\u"));

    let first_object = &text[..text.find('}').unwrap()];
    let positions: Vec<usize> = ["\"id\"", "\"name\"", "\"age\"", "\"grade\"", "\"score\"", "\"city\""]
        .iter()
        .map(|key| first_object.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    let parsed: Value = serde_json::from_str(&text).unwrap();
    let array = parsed.as_array().unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array[0]["name"], "Alice");
    assert_eq!(array[0]["score"], 91.5);
}

#[test]
fn export_of_empty_store_writes_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");

    assert_eq!(export_to(&path, &[]).unwrap(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
}

#[test]
fn export_to_unwritable_path_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("students.json");

    let err = export_to(&path, &seeded_records()).unwrap_err();
    match err {
        ExportError::Io { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_export_rejects_malformed_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

    assert!(matches!(
        load_export(&path),
        Err(ExportError::Parse { .. })
    ));
}
