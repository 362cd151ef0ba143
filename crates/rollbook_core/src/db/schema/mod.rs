//! Record table bootstrap.
//!
//! The store has a single schema step. `PRAGMA user_version` records that it
//! ran, so a database written by a newer build is refused instead of being
//! read with the wrong column expectations.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_VERSION: u32 = 1;
const STUDENTS_SQL: &str = include_str!("students.sql");

/// Schema version stamped by this build.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Creates the `students` table when the connection is not yet stamped.
///
/// A table that already exists unstamped (older builds never set
/// `user_version`) is kept as is and only stamped.
pub fn bootstrap_schema(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(STUDENTS_SQL)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}

/// Reads the schema version stamped on the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
