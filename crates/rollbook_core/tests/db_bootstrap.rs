use rollbook_core::db::schema::latest_version;
use rollbook_core::db::{close_db, open_db, open_db_in_memory, DbError};
use rollbook_core::{
    load_export, ChartBody, ChartKind, Command, Controller, Outcome, SortKey, StudentRecord,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_students_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "students");
}

#[test]
fn opening_same_database_twice_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO students (name, age, grade, score, city) VALUES ('Alice', 20, 'A', 91.5, 'Beijing');",
            [],
        )
        .unwrap();
    close_db(conn_first).unwrap();

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let rows: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn opening_legacy_table_without_version_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER,
            grade TEXT,
            score REAL,
            city TEXT
        );
        INSERT INTO students (name, age, grade, score, city) VALUES ('Bob', 21, 'B', 77.0, 'Shanghai');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let name: String = conn
        .query_row("SELECT name FROM students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Bob");
}

#[test]
fn legacy_rows_with_unreadable_scores_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER,
            grade TEXT,
            score REAL,
            city TEXT
        );
        INSERT INTO students (name, age, grade, score, city) VALUES ('Bob', 21, 'B', 77.0, 'Shanghai');
        INSERT INTO students (name, age, grade, score, city) VALUES ('Eve', 22, 'C', 9e999, 'Beijing');
        INSERT INTO students (name, age, grade, score, city) VALUES ('Nan', 23, 'C', NULL, 'Beijing');
        INSERT INTO students (name, age, grade, score, city) VALUES ('Dan', 24, NULL, 65.0, NULL);",
    )
    .unwrap();
    drop(conn);

    let mut controller = Controller::new(open_db(&path).unwrap());

    let Outcome::Listing(records) = controller.dispatch(Command::Refresh(SortKey::default()))
    else {
        panic!("legacy rows should not fail the listing");
    };
    let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Dan"]);
    assert_eq!(records[1].grade, "");
    assert_eq!(records[1].city, "");

    let export_path = dir.path().join("legacy.json");
    assert!(matches!(
        controller.dispatch(Command::Export(export_path.clone())),
        Outcome::Exported { count: 2, .. }
    ));
    let exported: Vec<StudentRecord> = load_export(&export_path).unwrap();
    assert_eq!(exported, records);

    let Outcome::Chart(chart) = controller.dispatch(Command::ShowChart(ChartKind::ScoreHistogram))
    else {
        panic!("expected score chart");
    };
    let ChartBody::Histogram(histogram) = chart.body else {
        panic!("expected histogram body");
    };
    assert_eq!(histogram.total(), 2);

    let Outcome::Chart(chart) = controller.dispatch(Command::ShowChart(ChartKind::CityPie)) else {
        panic!("expected city chart");
    };
    let ChartBody::Pie(pie) = chart.body else {
        panic!("expected pie body");
    };
    let total: u64 = pie.wedges.iter().map(|wedge| wedge.count).sum();
    assert_eq!(total, 2);

    // The unreadable row can still be removed by id.
    controller.dispatch(Command::RequestDelete(vec![2]));
    match controller.dispatch(Command::ConfirmDelete) {
        Outcome::Deleted { removed, listing } => {
            assert_eq!(removed, 1);
            assert_eq!(listing.len(), 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    controller.close().unwrap();
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_unwritable_location_returns_sqlite_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("students.db");

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
