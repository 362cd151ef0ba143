//! Form/table controller dispatching user commands.
//!
//! # Responsibility
//! - Own the store connection for the lifetime of a UI session.
//! - Turn user commands into service calls and user-visible outcomes.
//!
//! # Invariants
//! - `dispatch` never returns an error; failures become `Outcome::Failed`.
//! - Deletes require a non-empty selection and an explicit confirmation step.
//! - Every mutating command returns a refreshed listing.
//! - Charts are never computed from an empty projection.

use crate::chart::{city_pie, histogram, Chart, ChartError, ChartKind, DEFAULT_BUCKET_COUNT};
use crate::config::AppConfig;
use crate::db::{close_db, open_db, DbError, DbResult};
use crate::export::{export_to, ExportError};
use crate::listing::SortKey;
use crate::model::student::{StudentForm, StudentId, StudentRecord, StudentValidationError};
use crate::repo::student_repo::{NumericField, RepoError, SqliteStudentRepository};
use crate::service::student_service::StudentService;
use crate::weather::{SimulatedWeather, WeatherError, WeatherSource};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const NO_DATA_MESSAGE: &str = "No data to display";

/// One user action from any of the four views.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Submits the form; the draft is cleared on success and kept on failure.
    Add(StudentForm),
    ClearForm,
    /// Lists every record in `SortKey` order; later listings keep that order.
    Refresh(SortKey),
    /// Stages the selected ids for deletion; nothing is removed yet.
    RequestDelete(Vec<StudentId>),
    ConfirmDelete,
    CancelDelete,
    Export(PathBuf),
    FetchWeather(String),
    ShowChart(ChartKind),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::ClearForm => "clear_form",
            Self::Refresh(_) => "refresh",
            Self::RequestDelete(_) => "request_delete",
            Self::ConfirmDelete => "confirm_delete",
            Self::CancelDelete => "cancel_delete",
            Self::Export(_) => "export",
            Self::FetchWeather(_) => "fetch_weather",
            Self::ShowChart(_) => "show_chart",
        }
    }
}

/// User-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input; the user can correct and retry.
    Validation,
    /// Backing store failure.
    Storage,
    /// Export file could not be written.
    Io,
}

/// Result of dispatching one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added {
        id: StudentId,
        listing: Vec<StudentRecord>,
    },
    FormCleared,
    Listing(Vec<StudentRecord>),
    ConfirmationRequired {
        ids: Vec<StudentId>,
        prompt: String,
    },
    DeleteCancelled,
    Deleted {
        removed: usize,
        listing: Vec<StudentRecord>,
    },
    Exported {
        path: PathBuf,
        count: usize,
    },
    Weather(String),
    Chart(Chart),
    Warning(String),
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

impl Outcome {
    /// Short status line suitable for a message box or terminal.
    pub fn message(&self) -> String {
        match self {
            Self::Added { id, .. } => format!("Student added (id {id})."),
            Self::FormCleared => "Form cleared.".to_string(),
            Self::Listing(records) => format!("{} record(s).", records.len()),
            Self::ConfirmationRequired { prompt, .. } => prompt.clone(),
            Self::DeleteCancelled => "Delete cancelled.".to_string(),
            Self::Deleted { removed, .. } => format!("Deleted {removed} record(s)."),
            Self::Exported { path, count } => {
                format!("Exported {count} record(s) to {}", path.display())
            }
            Self::Weather(text) => text.clone(),
            Self::Chart(chart) => chart.title.clone(),
            Self::Warning(message) => message.clone(),
            Self::Failed { message, .. } => message.clone(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Refreshed listing carried by this outcome, if any.
    pub fn listing(&self) -> Option<&[StudentRecord]> {
        match self {
            Self::Added { listing, .. } | Self::Deleted { listing, .. } => Some(listing),
            Self::Listing(listing) => Some(listing),
            _ => None,
        }
    }
}

/// Controller-boundary error; converted to `Outcome::Failed` by `dispatch`.
#[derive(Debug)]
pub enum ControllerError {
    Validation(StudentValidationError),
    Storage(RepoError),
    Export(ExportError),
    Chart(ChartError),
    Weather(WeatherError),
    NoSelection,
    NoPendingDelete,
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(RepoError::Validation(_)) => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Export(_) => ErrorKind::Io,
            Self::Validation(_)
            | Self::Chart(_)
            | Self::Weather(_)
            | Self::NoSelection
            | Self::NoPendingDelete => ErrorKind::Validation,
        }
    }
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "Invalid input: {err}"),
            Self::Storage(err) => write!(f, "Storage failure: {err}"),
            Self::Export(err) => write!(f, "Export failed: {err}"),
            Self::Chart(err) => write!(f, "Chart failed: {err}"),
            Self::Weather(err) => write!(f, "Weather lookup failed: {err}"),
            Self::NoSelection => write!(f, "Select at least one record to delete"),
            Self::NoPendingDelete => write!(f, "No delete is waiting for confirmation"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Chart(err) => Some(err),
            Self::Weather(err) => Some(err),
            Self::NoSelection | Self::NoPendingDelete => None,
        }
    }
}

impl From<StudentValidationError> for ControllerError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<ExportError> for ControllerError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<ChartError> for ControllerError {
    fn from(value: ChartError) -> Self {
        Self::Chart(value)
    }
}

impl From<WeatherError> for ControllerError {
    fn from(value: WeatherError) -> Self {
        Self::Weather(value)
    }
}

/// Session controller owning the store connection.
pub struct Controller<W: WeatherSource = SimulatedWeather> {
    conn: Connection,
    weather: W,
    pending_delete: Option<Vec<StudentId>>,
    sort: SortKey,
    form: StudentForm,
}

impl Controller<SimulatedWeather> {
    /// Opens the configured database and builds a controller over it.
    pub fn open(config: &AppConfig) -> DbResult<Self> {
        Ok(Self::new(open_db(&config.db_path)?))
    }

    /// Wraps an already bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self::with_weather(conn, SimulatedWeather)
    }
}

impl<W: WeatherSource> Controller<W> {
    pub fn with_weather(conn: Connection, weather: W) -> Self {
        Self {
            conn,
            weather,
            pending_delete: None,
            sort: SortKey::default(),
            form: StudentForm::default(),
        }
    }

    /// Form text as last submitted; blank after a successful add or a clear.
    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    /// Order applied to every listing this controller returns.
    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    /// Ids staged by `RequestDelete` and not yet confirmed or cancelled.
    pub fn pending_delete(&self) -> Option<&[StudentId]> {
        self.pending_delete.as_deref()
    }

    /// Releases the store connection.
    pub fn close(self) -> DbResult<()> {
        close_db(self.conn)
    }

    /// Runs one command and converts any failure into `Outcome::Failed`.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let name = command.name();
        match self.try_dispatch(command) {
            Ok(outcome) => {
                info!("event=command module=controller status=ok command={name}");
                outcome
            }
            Err(err) => {
                let kind = err.kind();
                warn!(
                    "event=command module=controller status=error command={name} kind={kind:?} error={err}"
                );
                Outcome::Failed {
                    kind,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Runs one command, returning the controller error unchanged.
    pub fn try_dispatch(&mut self, command: Command) -> Result<Outcome, ControllerError> {
        match command {
            Command::Add(form) => {
                self.form = form;
                let student = self.form.parse()?;
                let id = self.service()?.add_student(&student)?;
                let listing = self.listing()?;
                self.form = StudentForm::default();
                Ok(Outcome::Added { id, listing })
            }
            Command::ClearForm => {
                self.form = StudentForm::default();
                Ok(Outcome::FormCleared)
            }
            Command::Refresh(sort) => {
                self.sort = sort;
                Ok(Outcome::Listing(self.listing()?))
            }
            Command::RequestDelete(ids) => {
                if ids.is_empty() {
                    return Err(ControllerError::NoSelection);
                }
                let prompt = format!("Delete {} selected record(s)?", ids.len());
                self.pending_delete = Some(ids.clone());
                Ok(Outcome::ConfirmationRequired { ids, prompt })
            }
            Command::ConfirmDelete => {
                let ids = self
                    .pending_delete
                    .take()
                    .ok_or(ControllerError::NoPendingDelete)?;
                let removed = self.service()?.delete_students(&ids)?;
                Ok(Outcome::Deleted {
                    removed,
                    listing: self.listing()?,
                })
            }
            Command::CancelDelete => {
                self.pending_delete = None;
                Ok(Outcome::DeleteCancelled)
            }
            Command::Export(path) => {
                let records = self.service()?.list_students()?;
                let count = export_to(&path, &records)?;
                Ok(Outcome::Exported { path, count })
            }
            Command::FetchWeather(city) => {
                let report = self.weather.lookup(&city)?;
                Ok(Outcome::Weather(report.to_display_text()))
            }
            Command::ShowChart(kind) => self.chart(kind),
        }
    }

    fn chart(&self, kind: ChartKind) -> Result<Outcome, ControllerError> {
        let service = self.service()?;
        let field = match kind {
            ChartKind::AgeHistogram => NumericField::Age,
            ChartKind::ScoreHistogram => NumericField::Score,
            ChartKind::CityPie => {
                let counts = service.city_counts()?;
                if counts.is_empty() {
                    return Ok(Outcome::Warning(NO_DATA_MESSAGE.to_string()));
                }
                return Ok(Outcome::Chart(Chart::pie(city_pie(&counts)?)));
            }
        };

        let values = service.numeric_projection(field)?;
        if values.is_empty() {
            return Ok(Outcome::Warning(NO_DATA_MESSAGE.to_string()));
        }
        let binned = histogram(&values, DEFAULT_BUCKET_COUNT)?;
        Ok(Outcome::Chart(Chart::histogram(kind, binned)))
    }

    fn listing(&self) -> Result<Vec<StudentRecord>, RepoError> {
        let mut records = self.service()?.list_students()?;
        self.sort.apply(&mut records);
        Ok(records)
    }

    fn service(&self) -> Result<StudentService<SqliteStudentRepository<'_>>, RepoError> {
        Ok(StudentService::new(SqliteStudentRepository::try_new(
            &self.conn,
        )?))
    }
}

/// Opens the configured store, runs `session`, then closes the store.
pub fn run_session<T>(
    config: &AppConfig,
    session: impl FnOnce(&mut Controller) -> T,
) -> Result<T, DbError> {
    let mut controller = Controller::open(config)?;
    let result = session(&mut controller);
    controller.close()?;
    Ok(result)
}
