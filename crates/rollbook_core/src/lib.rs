//! Core domain logic for Rollbook student records.
//! This crate is the single source of truth for record invariants.

pub mod chart;
pub mod config;
pub mod controller;
pub mod db;
pub mod export;
pub mod listing;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod weather;

pub use chart::{render_text, Chart, ChartBody, ChartError, ChartKind, Histogram, PieChart};
pub use config::AppConfig;
pub use controller::{run_session, Command, Controller, ControllerError, ErrorKind, Outcome};
pub use export::{export_to, load_export, ExportError};
pub use listing::{SortColumn, SortKey};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::student::{NewStudent, StudentForm, StudentId, StudentRecord, StudentValidationError};
pub use repo::student_repo::{
    CityCount, NumericField, RepoError, RepoResult, SqliteStudentRepository, StudentRepository,
};
pub use service::student_service::StudentService;
pub use weather::{SimulatedWeather, WeatherError, WeatherReport, WeatherSource};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
