//! Terminal front end for Rollbook.
//!
//! # Responsibility
//! - Map subcommands onto controller commands for one store session.
//! - Print outcomes the way the desktop views would show them.

use clap::{Parser, Subcommand, ValueEnum};
use rollbook_core::config::absolutize;
use rollbook_core::controller::Outcome;
use rollbook_core::export::{default_export_file_name, ensure_json_extension};
use rollbook_core::weather::DEFAULT_WEATHER_CITY;
use rollbook_core::{
    init_logging_from_config, render_text, run_session, AppConfig, ChartKind, Command,
    Controller, SortColumn, SortKey, StudentForm, StudentRecord,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rollbook", version, about = "Record and chart student records")]
struct Cli {
    /// SQLite database file (overrides ROLLBOOK_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides ROLLBOOK_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log directory; relative paths resolve against the current directory
    /// (overrides ROLLBOOK_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Add one student record.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long, default_value = "")]
        grade: String,
        #[arg(long)]
        score: String,
        #[arg(long, default_value = "")]
        city: String,
    },
    /// List all records, in insertion order unless sorted.
    List {
        /// Column to sort by.
        #[arg(long, value_enum, default_value_t = SortArg::Id)]
        sort: SortArg,
        /// Sort in descending order.
        #[arg(long)]
        desc: bool,
    },
    /// Delete records by id after confirmation.
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Export all records as indented JSON.
    Export { path: Option<PathBuf> },
    /// Show the simulated weather for a city.
    Weather { city: Option<String> },
    /// Draw a chart over the stored records.
    Chart {
        #[arg(value_enum)]
        kind: ChartArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChartArg {
    Age,
    Score,
    City,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Id,
    Name,
    Age,
    Grade,
    Score,
    City,
}

impl From<SortArg> for SortColumn {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Id => SortColumn::Id,
            SortArg::Name => SortColumn::Name,
            SortArg::Age => SortColumn::Age,
            SortArg::Grade => SortColumn::Grade,
            SortArg::Score => SortColumn::Score,
            SortArg::City => SortColumn::City,
        }
    }
}

impl From<ChartArg> for ChartKind {
    fn from(value: ChartArg) -> Self {
        match value {
            ChartArg::Age => ChartKind::AgeHistogram,
            ChartArg::Score => ChartKind::ScoreHistogram,
            ChartArg::City => ChartKind::CityPie,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run_session(&config, |controller| run(controller, cli.command)) {
        Ok(outcome) => report(&outcome),
        Err(err) => {
            eprintln!("error: cannot open {}: {err}", config.db_path.display());
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = absolutize(dir);
    }
    config
}

fn run(controller: &mut Controller, command: CliCommand) -> Outcome {
    match command {
        CliCommand::Add {
            name,
            age,
            grade,
            score,
            city,
        } => controller.dispatch(Command::Add(StudentForm {
            name,
            age,
            grade,
            score,
            city,
        })),
        CliCommand::List { sort, desc } => {
            controller.dispatch(Command::Refresh(SortKey::new(sort.into(), desc)))
        }
        CliCommand::Delete { ids, yes } => {
            let requested = controller.dispatch(Command::RequestDelete(ids));
            if requested.is_failure() {
                return requested;
            }
            if yes || confirm(&requested.message()) {
                controller.dispatch(Command::ConfirmDelete)
            } else {
                controller.dispatch(Command::CancelDelete)
            }
        }
        CliCommand::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(default_export_file_name()));
            controller.dispatch(Command::Export(ensure_json_extension(path)))
        }
        CliCommand::Weather { city } => controller.dispatch(Command::FetchWeather(
            city.unwrap_or_else(|| DEFAULT_WEATHER_CITY.to_string()),
        )),
        CliCommand::Chart { kind } => controller.dispatch(Command::ShowChart(kind.into())),
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn report(outcome: &Outcome) -> ExitCode {
    match outcome {
        Outcome::Failed { kind, message } => {
            eprintln!("error ({kind:?}): {message}");
            return ExitCode::FAILURE;
        }
        Outcome::Warning(message) => eprintln!("warning: {message}"),
        Outcome::Chart(chart) => print!("{}", render_text(chart)),
        Outcome::Weather(text) => println!("{text}"),
        Outcome::Listing(records) => print_table(records),
        Outcome::Added { .. } | Outcome::Deleted { .. } => {
            println!("{}", outcome.message());
            if let Some(records) = outcome.listing() {
                print_table(records);
            }
        }
        other => println!("{}", other.message()),
    }
    ExitCode::SUCCESS
}

fn print_table(records: &[StudentRecord]) {
    println!(
        "{:>5}  {:<16} {:>4}  {:<8} {:>8}  {:<16}",
        "ID", "Name", "Age", "Grade", "Score", "City"
    );
    for record in records {
        println!(
            "{:>5}  {:<16} {:>4}  {:<8} {:>8.2}  {:<16}",
            record.id, record.name, record.age, record.grade, record.score, record.city
        );
    }
}
