//! FFI use-case API for the Flutter desktop UI.
//!
//! # Responsibility
//! - Expose record, export, weather and chart actions to Dart via FRB.
//! - Translate controller outcomes into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One store connection is held from `app_open` until `app_close`; every
//!   record call between them goes through the same controller.
//! - Record calls made while the store is closed return `ok=false`.

use log::{info, warn};
use rollbook_core::config::DB_PATH_ENV;
use rollbook_core::controller::Outcome;
use rollbook_core::db::open_db;
use rollbook_core::export::ensure_json_extension;
use rollbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Chart, ChartBody, ChartKind, Command, Controller, SortColumn, SortKey, StudentForm,
    StudentRecord,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

const ENTRY_DB_FILE_NAME: &str = "rollbook_students.sqlite3";
const STORE_CLOSED_MESSAGE: &str = "Student store is not open.";

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

struct Session {
    db_path: PathBuf,
    controller: Controller,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the "Browse" table.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentItem {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub grade: String,
    pub score: f64,
    pub city: String,
}

/// Listing envelope for the "Browse" view.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentListResponse {
    pub ok: bool,
    pub items: Vec<StudentItem>,
    pub message: String,
}

/// Generic action envelope for add/delete/export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created record id for add actions.
    pub student_id: Option<i64>,
    /// Human-readable message for a message box.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, student_id: Option<i64>) -> Self {
        Self {
            ok: true,
            student_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            student_id: None,
            message: message.into(),
        }
    }
}

/// Text of the five "Add Record" fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub name: String,
    pub age: String,
    pub grade: String,
    pub score: String,
    pub city: String,
}

/// Text envelope for the "Weather" view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub ok: bool,
    pub text: String,
}

/// One bar or wedge for the chart surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub value: u64,
    /// Set for pie wedges only.
    pub percent_label: Option<String>,
}

/// Chart envelope; `bars` is empty when `ok` is false.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartResponse {
    pub ok: bool,
    /// `histogram` or `pie`.
    pub shape: String,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub bars: Vec<ChartBar>,
    pub message: String,
}

impl ChartResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            shape: String::new(),
            title: String::new(),
            x_label: None,
            y_label: None,
            bars: Vec::new(),
            message: message.into(),
        }
    }
}

/// Opens the student store for the rest of the process.
///
/// A blank `db_path` uses `ROLLBOOK_DB_PATH`, then
/// `<temp>/rollbook_students.sqlite3`. Opening the already-open path again is
/// a no-op; opening a different path requires `app_close` first.
#[flutter_rust_bridge::frb(sync)]
pub fn app_open(db_path: String) -> ActionResponse {
    let db_path = resolve_db_path(&db_path);
    let mut session = lock_session();

    if let Some(current) = session.as_ref() {
        if current.db_path == db_path {
            return ActionResponse::success("Student store already open.", None);
        }
        return ActionResponse::failure(format!(
            "Student store already open at {}; close it first.",
            current.db_path.display()
        ));
    }

    match open_db(&db_path) {
        Ok(conn) => {
            info!("event=app_open module=ffi status=ok");
            *session = Some(Session {
                db_path,
                controller: Controller::new(conn),
            });
            ActionResponse::success("Student store opened.", None)
        }
        Err(err) => {
            warn!("event=app_open module=ffi status=error error={err}");
            ActionResponse::failure(format!("student DB open failed: {err}"))
        }
    }
}

/// Releases the student store. Closing a store that is not open is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn app_close() -> ActionResponse {
    let Some(session) = lock_session().take() else {
        return ActionResponse::success("Student store was not open.", None);
    };
    match session.controller.close() {
        Ok(()) => {
            info!("event=app_close module=ffi status=ok");
            ActionResponse::success("Student store closed.", None)
        }
        Err(err) => {
            warn!("event=app_close module=ffi status=error error={err}");
            ActionResponse::failure(format!("student DB close failed: {err}"))
        }
    }
}

/// Adds one record from raw form text.
///
/// Validation failures return `ok=false` with the reason; nothing is written
/// and the text stays in `form_draft`.
#[flutter_rust_bridge::frb(sync)]
pub fn student_add(
    name: String,
    age: String,
    grade: String,
    score: String,
    city: String,
) -> ActionResponse {
    let form = StudentForm {
        name,
        age,
        grade,
        score,
        city,
    };
    match with_controller(|controller| controller.dispatch(Command::Add(form))) {
        Ok(outcome) => match &outcome {
            Outcome::Added { id, .. } => ActionResponse::success(outcome.message(), Some(*id)),
            _ => ActionResponse::failure(outcome.message()),
        },
        Err(message) => ActionResponse::failure(message),
    }
}

/// Returns the form text to show after the last add or clear.
#[flutter_rust_bridge::frb(sync)]
pub fn form_draft() -> FormDraft {
    lock_session()
        .as_ref()
        .map(|session| {
            let form = session.controller.form();
            FormDraft {
                name: form.name.clone(),
                age: form.age.clone(),
                grade: form.grade.clone(),
                score: form.score.clone(),
                city: form.city.clone(),
            }
        })
        .unwrap_or_default()
}

/// Clears the "Add Record" form.
#[flutter_rust_bridge::frb(sync)]
pub fn form_clear() -> ActionResponse {
    action_response(with_controller(|controller| {
        controller.dispatch(Command::ClearForm)
    }))
}

/// Lists every record ordered by `sort_column` (`id` when blank).
///
/// The order sticks: listings returned by later add/delete calls use it too.
#[flutter_rust_bridge::frb(sync)]
pub fn student_list(sort_column: String, descending: bool) -> StudentListResponse {
    let column = if sort_column.trim().is_empty() {
        SortColumn::Id
    } else {
        match SortColumn::from_name(&sort_column) {
            Some(column) => column,
            None => {
                return StudentListResponse {
                    ok: false,
                    items: Vec::new(),
                    message: format!("unknown sort column `{}`", sort_column.trim()),
                }
            }
        }
    };
    let sort = SortKey::new(column, descending);

    match with_controller(|controller| controller.dispatch(Command::Refresh(sort))) {
        Ok(Outcome::Listing(records)) => StudentListResponse {
            ok: true,
            message: format!("{} record(s).", records.len()),
            items: records.into_iter().map(to_student_item).collect(),
        },
        Ok(outcome) => StudentListResponse {
            ok: false,
            items: Vec::new(),
            message: outcome.message(),
        },
        Err(message) => StudentListResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
    }
}

/// Stages the selected ids for deletion and returns the confirmation prompt.
///
/// Nothing is deleted until `student_delete_confirm`.
#[flutter_rust_bridge::frb(sync)]
pub fn student_delete_request(ids: Vec<i64>) -> ActionResponse {
    action_response(with_controller(|controller| {
        controller.dispatch(Command::RequestDelete(ids))
    }))
}

/// Deletes the ids staged by `student_delete_request`.
#[flutter_rust_bridge::frb(sync)]
pub fn student_delete_confirm() -> ActionResponse {
    action_response(with_controller(|controller| {
        controller.dispatch(Command::ConfirmDelete)
    }))
}

/// Drops the staged selection without deleting.
#[flutter_rust_bridge::frb(sync)]
pub fn student_delete_cancel() -> ActionResponse {
    action_response(with_controller(|controller| {
        controller.dispatch(Command::CancelDelete)
    }))
}

/// Exports all records as JSON to `path`, adding `.json` when no extension is given.
///
/// A blank path means the save dialog was cancelled.
#[flutter_rust_bridge::frb(sync)]
pub fn student_export(path: String) -> ActionResponse {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return ActionResponse::failure("Export cancelled.");
    }
    let target = ensure_json_extension(trimmed);
    action_response(with_controller(|controller| {
        controller.dispatch(Command::Export(target))
    }))
}

/// Returns the simulated weather block for `city`.
#[flutter_rust_bridge::frb(sync)]
pub fn weather_fetch(city: String) -> TextResponse {
    match with_controller(|controller| controller.dispatch(Command::FetchWeather(city))) {
        Ok(Outcome::Weather(text)) => TextResponse { ok: true, text },
        Ok(outcome) => TextResponse {
            ok: false,
            text: outcome.message(),
        },
        Err(text) => TextResponse { ok: false, text },
    }
}

/// Computes chart data for `kind` (`age`, `score` or `city`).
///
/// An empty store returns `ok=false` with a no-data warning.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_data(kind: String) -> ChartResponse {
    let Some(kind) = ChartKind::from_name(&kind) else {
        return ChartResponse::failure(format!("unknown chart kind `{}`", kind.trim()));
    };
    match with_controller(|controller| controller.dispatch(Command::ShowChart(kind))) {
        Ok(Outcome::Chart(chart)) => to_chart_response(chart),
        Ok(outcome) => ChartResponse::failure(outcome.message()),
        Err(message) => ChartResponse::failure(message),
    }
}

fn resolve_db_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        return PathBuf::from(trimmed);
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_controller(f: impl FnOnce(&mut Controller) -> Outcome) -> Result<Outcome, String> {
    match lock_session().as_mut() {
        Some(session) => Ok(f(&mut session.controller)),
        None => Err(STORE_CLOSED_MESSAGE.to_string()),
    }
}

fn action_response(result: Result<Outcome, String>) -> ActionResponse {
    match result {
        Ok(outcome) if outcome.is_failure() => ActionResponse::failure(outcome.message()),
        Ok(outcome) => ActionResponse::success(outcome.message(), None),
        Err(message) => ActionResponse::failure(message),
    }
}

fn to_student_item(record: StudentRecord) -> StudentItem {
    StudentItem {
        id: record.id,
        name: record.name,
        age: record.age,
        grade: record.grade,
        score: record.score,
        city: record.city,
    }
}

fn to_chart_response(chart: Chart) -> ChartResponse {
    let (x_label, y_label) = match chart.kind.axis_labels() {
        Some((x, y)) => (Some(x.to_string()), Some(y.to_string())),
        None => (None, None),
    };
    let (shape, bars) = match chart.body {
        ChartBody::Histogram(histogram) => (
            "histogram",
            histogram
                .buckets
                .into_iter()
                .map(|bucket| ChartBar {
                    label: format!("{:.1}-{:.1}", bucket.lower, bucket.upper),
                    value: bucket.count,
                    percent_label: None,
                })
                .collect(),
        ),
        ChartBody::Pie(pie) => (
            "pie",
            pie.wedges
                .into_iter()
                .map(|wedge| ChartBar {
                    label: wedge.label,
                    value: wedge.count,
                    percent_label: Some(wedge.percent_label),
                })
                .collect(),
        ),
    };

    ChartResponse {
        ok: true,
        shape: shape.to_string(),
        message: chart.title.clone(),
        title: chart.title,
        x_label,
        y_label,
        bars,
    }
}
