//! JSON snapshot export of the record set.
//!
//! # Responsibility
//! - Write every record to a user-chosen path as indented UTF-8 JSON.
//! - Read an export back for verification.
//!
//! # Invariants
//! - Object keys are written in `id, name, age, grade, score, city` order.
//! - Non-ASCII text is written literally, never `\u` escaped.
//! - Writes are not atomic; a failed write may leave a partial file.

use crate::model::student::StudentRecord;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const DEFAULT_EXPORT_FILE_NAME: &str = "students.json";
const EXPORT_EXTENSION: &str = "json";

pub type ExportResult<T> = Result<T, ExportError>;

/// Export/read failure.
#[derive(Debug)]
pub enum ExportError {
    /// Path could not be created, written or read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Serialize(serde_json::Error),
    /// File exists but is not a valid export document.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot access `{}`: {source}", path.display()),
            Self::Serialize(err) => write!(f, "failed to encode records: {err}"),
            Self::Parse { path, source } => {
                write!(f, "`{}` is not a valid export: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// File name proposed when the user has not chosen one.
pub fn default_export_file_name() -> &'static str {
    DEFAULT_EXPORT_FILE_NAME
}

/// Appends `.json` to a path that has no extension.
pub fn ensure_json_extension(path: impl Into<PathBuf>) -> PathBuf {
    let mut path = path.into();
    if path.extension().is_none() {
        path.set_extension(EXPORT_EXTENSION);
    }
    path
}

/// Writes `records` to `path` and returns how many were written.
///
/// Existing files are overwritten.
///
/// # Errors
/// - `Io` when the path cannot be created or written.
/// - `Serialize` when encoding fails.
pub fn export_to(path: impl AsRef<Path>, records: &[StudentRecord]) -> ExportResult<usize> {
    let path = path.as_ref();
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let result = File::create(path).map_err(io_error).and_then(|file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records).map_err(|err| {
            if err.is_io() {
                ExportError::Io {
                    path: path.to_path_buf(),
                    source: err.into(),
                }
            } else {
                ExportError::Serialize(err)
            }
        })?;
        writer.write_all(b"\n").map_err(io_error)?;
        writer.flush().map_err(io_error)
    });

    match result {
        Ok(()) => {
            info!(
                "event=export_json module=export status=ok count={}",
                records.len()
            );
            Ok(records.len())
        }
        Err(err) => {
            error!("event=export_json module=export status=error error={err}");
            Err(err)
        }
    }
}

/// Reads an export document written by [`export_to`].
pub fn load_export(path: impl AsRef<Path>) -> ExportResult<Vec<StudentRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ExportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
