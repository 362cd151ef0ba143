//! Column ordering for the browse table.
//!
//! The store always lists in id order; any other order is applied on top of
//! that listing, so rows that tie on the chosen column stay in id order.

use crate::model::student::StudentRecord;
use std::cmp::Ordering;

/// Browse table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Id,
    Name,
    Age,
    Grade,
    Score,
    City,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        Self::Id,
        Self::Name,
        Self::Age,
        Self::Grade,
        Self::Score,
        Self::City,
    ];

    /// Parses a column name (`id`, `name`, `age`, `grade`, `score`, `city`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "age" => Some(Self::Age),
            "grade" => Some(Self::Grade),
            "score" => Some(Self::Score),
            "city" => Some(Self::City),
            _ => None,
        }
    }

    fn compare(self, left: &StudentRecord, right: &StudentRecord) -> Ordering {
        match self {
            Self::Id => left.id.cmp(&right.id),
            Self::Name => left.name.cmp(&right.name),
            Self::Age => left.age.cmp(&right.age),
            Self::Grade => left.grade.cmp(&right.grade),
            Self::Score => left.score.total_cmp(&right.score),
            Self::City => left.city.cmp(&right.city),
        }
    }
}

/// Column plus direction; the default is id ascending (insertion order).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortKey {
    pub column: SortColumn,
    pub descending: bool,
}

impl SortKey {
    pub fn new(column: SortColumn, descending: bool) -> Self {
        Self { column, descending }
    }

    /// Reorders an id-ordered listing in place.
    pub fn apply(self, records: &mut [StudentRecord]) {
        if self == Self::default() {
            return;
        }
        records.sort_by(|left, right| {
            let ordering = self.column.compare(left, right);
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}
