//! Student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/delete/aggregate APIs over the `students` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `NewStudent::validate()` before SQL mutations.
//! - Listing order is `id ASC`, which is insertion order.
//! - Ids come from `AUTOINCREMENT` and are never reused after deletion.
//! - Rows without a usable age or a finite score (possible in tables written
//!   by older builds) are skipped by every read path and logged by id.

use crate::db::schema::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::student::{NewStudent, StudentId, StudentRecord, StudentValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    COALESCE(name, '') AS name,
    age,
    COALESCE(grade, '') AS grade,
    score,
    COALESCE(city, '') AS city
FROM students";

/// Rows every read path can represent. `9e999` is SQLite's infinity literal;
/// NaN is stored as NULL.
const READABLE_ROW_SQL: &str = "typeof(age) = 'integer'
    AND typeof(score) IN ('integer', 'real')
    AND abs(score) < 9e999";

const STUDENT_COLUMNS: [&str; 6] = ["id", "name", "age", "grade", "score", "city"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    Db(DbError),
    InvalidData(String),
    /// Connection was opened without running the schema bootstrap.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Per-city record count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCount {
    pub city: String,
    pub count: u64,
}

/// Numeric field that can be projected across all records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Age,
    Score,
}

impl NumericField {
    fn column(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Score => "score",
        }
    }
}

/// Repository interface for student record operations.
pub trait StudentRepository {
    /// Inserts one record and returns the store-assigned id.
    fn insert(&self, student: &NewStudent) -> RepoResult<StudentId>;
    /// Lists every record in insertion order.
    fn list_all(&self) -> RepoResult<Vec<StudentRecord>>;
    /// Deletes one record; returns `false` when the id was not present.
    fn delete_by_id(&self, id: StudentId) -> RepoResult<bool>;
    /// Counts records per city, sorted by city name.
    fn aggregate_by_city(&self) -> RepoResult<Vec<CityCount>>;
    /// Returns one numeric field for every record, in `list_all` order.
    fn project_numeric(&self, field: NumericField) -> RepoResult<Vec<f64>>;
    /// Returns the number of records `list_all` would return.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn insert(&self, student: &NewStudent) -> RepoResult<StudentId> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (name, age, grade, score, city)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                student.name.as_str(),
                student.age,
                student.grade.as_str(),
                student.score,
                student.city.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=student_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn list_all(&self) -> RepoResult<Vec<StudentRecord>> {
        warn_unreadable_rows(self.conn)?;
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} WHERE {READABLE_ROW_SQL} ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn delete_by_id(&self, id: StudentId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        debug!("event=student_delete module=repo status=ok id={id} changed={changed}");
        Ok(changed > 0)
    }

    fn aggregate_by_city(&self) -> RepoResult<Vec<CityCount>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT COALESCE(city, '') AS city, COUNT(*) AS total
             FROM students
             WHERE {READABLE_ROW_SQL}
             GROUP BY 1
             ORDER BY 1 ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();

        while let Some(row) = rows.next()? {
            let total: i64 = row.get("total")?;
            let count = u64::try_from(total).map_err(|_| {
                RepoError::InvalidData(format!("negative city count `{total}`"))
            })?;
            counts.push(CityCount {
                city: row.get("city")?,
                count,
            });
        }

        Ok(counts)
    }

    fn project_numeric(&self, field: NumericField) -> RepoResult<Vec<f64>> {
        let column = field.column();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT CAST({column} AS REAL) FROM students WHERE {READABLE_ROW_SQL} ORDER BY id ASC;"
        ))?;
        let values = stmt
            .query_map([], |row| row.get::<_, f64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM students WHERE {READABLE_ROW_SQL};"),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative record count `{total}`")))
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<StudentRecord> {
    let score: f64 = row.get("score")?;
    if !score.is_finite() {
        let id: i64 = row.get("id")?;
        return Err(RepoError::InvalidData(format!(
            "non-finite score in students.score for id {id}"
        )));
    }

    Ok(StudentRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        age: row.get("age")?,
        grade: row.get("grade")?,
        score,
        city: row.get("city")?,
    })
}

fn warn_unreadable_rows(conn: &Connection) -> RepoResult<()> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id FROM students WHERE NOT ({READABLE_ROW_SQL}) ORDER BY id ASC;"
    ))?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for id in ids {
        warn!("event=student_skip module=repo status=error id={id} reason=unreadable_age_or_score");
    }
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "students")? {
        return Err(RepoError::MissingRequiredTable("students"));
    }

    for column in STUDENT_COLUMNS {
        if !table_has_column(conn, "students", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "students",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM pragma_table_info(?1)
            WHERE name = ?2
        );",
        params![table, column],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
