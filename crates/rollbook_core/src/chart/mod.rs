//! Chart computation over record projections.
//!
//! # Responsibility
//! - Bin numeric projections into equal-width histograms.
//! - Turn per-city counts into proportional pie wedges.
//! - Render charts as text for terminal display surfaces.
//!
//! # Invariants
//! - Charts are never built from empty input; callers short-circuit first.
//! - Nothing is cached; every chart is recomputed from the values passed in.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod buckets;
mod wedges;
mod text;

pub use buckets::{histogram, Bucket, Histogram, DEFAULT_BUCKET_COUNT};
pub use wedges::{city_pie, PieChart, Wedge};
pub use text::render_text;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartError {
    /// No values (or no groups) to chart.
    EmptyInput,
    /// Histogram asked for zero buckets.
    InvalidBucketCount,
}

impl Display for ChartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "no data to chart"),
            Self::InvalidBucketCount => write!(f, "histogram bucket count must be positive"),
        }
    }
}

impl Error for ChartError {}

/// The three charts offered by the "Charts" view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    AgeHistogram,
    ScoreHistogram,
    CityPie,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::AgeHistogram => "Student Age Distribution",
            Self::ScoreHistogram => "Student Score Distribution",
            Self::CityPie => "Student City Distribution",
        }
    }

    /// Axis labels `(x, y)`; pies have none.
    pub fn axis_labels(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::AgeHistogram => Some(("Age", "Students")),
            Self::ScoreHistogram => Some(("Score", "Students")),
            Self::CityPie => None,
        }
    }

    /// Parses the short names used by command-line and FFI callers.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "age" | "age_histogram" => Some(Self::AgeHistogram),
            "score" | "score_histogram" => Some(Self::ScoreHistogram),
            "city" | "city_pie" => Some(Self::CityPie),
            _ => None,
        }
    }
}

/// Chart payload handed to a display surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Histogram(Histogram),
    Pie(PieChart),
}

impl Chart {
    pub fn histogram(kind: ChartKind, histogram: Histogram) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            body: ChartBody::Histogram(histogram),
        }
    }

    pub fn pie(pie: PieChart) -> Self {
        Self {
            kind: ChartKind::CityPie,
            title: ChartKind::CityPie.title().to_string(),
            body: ChartBody::Pie(pie),
        }
    }
}
