//! Student record model and form coercion.
//!
//! # Responsibility
//! - Define the persisted `StudentRecord` and the `NewStudent` insert payload.
//! - Convert raw form text into typed values (`StudentForm::parse`).
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another record.
//! - `name` is non-empty after trimming.
//! - `score` is a finite number.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier, strictly increasing across the store lifetime.
pub type StudentId = i64;

/// One stored student record.
///
/// Field order matches the export document key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub age: i64,
    /// Free-form label such as `A` or `Year 3`.
    pub grade: String,
    pub score: f64,
    /// Free-form label used as the pie chart grouping key.
    pub city: String,
}

/// Typed insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub age: i64,
    pub grade: String,
    pub score: f64,
    pub city: String,
}

impl NewStudent {
    /// Builds a payload from typed values without trimming.
    pub fn new(
        name: impl Into<String>,
        age: i64,
        grade: impl Into<String>,
        score: f64,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            grade: grade.into(),
            score,
            city: city.into(),
        }
    }

    /// Checks the invariants the store relies on.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trim.
    /// - `InvalidScore` when `score` is NaN or infinite.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        if !self.score.is_finite() {
            return Err(StudentValidationError::InvalidScore(self.score.to_string()));
        }
        Ok(())
    }
}

/// Raw text captured by the "Add Record" form.
///
/// Kept as strings so a failed parse leaves the user's input intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub age: String,
    pub grade: String,
    pub score: String,
    pub city: String,
}

impl StudentForm {
    /// Coerces form text into a typed insert payload.
    ///
    /// All fields are trimmed. `grade` and `city` accept any text.
    ///
    /// # Errors
    /// - `EmptyName` when the name is blank.
    /// - `InvalidAge` when age is not an integer.
    /// - `InvalidScore` when score is not a finite number.
    pub fn parse(&self) -> Result<NewStudent, StudentValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StudentValidationError::EmptyName);
        }

        let age_text = self.age.trim();
        let age = age_text
            .parse::<i64>()
            .map_err(|_| StudentValidationError::InvalidAge(age_text.to_string()))?;

        let score_text = self.score.trim();
        let score = score_text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| StudentValidationError::InvalidScore(score_text.to_string()))?;

        Ok(NewStudent::new(
            name,
            age,
            self.grade.trim(),
            score,
            self.city.trim(),
        ))
    }
}

/// Input validation failure surfaced to the user before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    /// Name is blank after trimming.
    EmptyName,
    /// Age text is not an integer.
    InvalidAge(String),
    /// Score text is not a finite number.
    InvalidScore(String),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::InvalidAge(raw) => write!(f, "age must be a whole number, got `{raw}`"),
            Self::InvalidScore(raw) => write!(f, "score must be a number, got `{raw}`"),
        }
    }
}

impl Error for StudentValidationError {}
