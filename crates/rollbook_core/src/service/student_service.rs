//! Student record use-case service.
//!
//! # Responsibility
//! - Provide stable record entry points for the controller and FFI callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::student::{NewStudent, StudentId, StudentRecord};
use crate::repo::student_repo::{CityCount, NumericField, RepoResult, StudentRepository};

/// Use-case service wrapper for student record operations.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one record and returns its store-assigned id.
    pub fn add_student(&self, student: &NewStudent) -> RepoResult<StudentId> {
        self.repo.insert(student)
    }

    /// Lists every record in insertion order.
    pub fn list_students(&self) -> RepoResult<Vec<StudentRecord>> {
        self.repo.list_all()
    }

    /// Deletes each id in `ids` and returns how many rows were removed.
    ///
    /// Missing ids are skipped silently.
    pub fn delete_students(&self, ids: &[StudentId]) -> RepoResult<usize> {
        let mut removed = 0;
        for id in ids {
            if self.repo.delete_by_id(*id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Per-city counts, sorted by city.
    pub fn city_counts(&self) -> RepoResult<Vec<CityCount>> {
        self.repo.aggregate_by_city()
    }

    /// One numeric field across all records, in listing order.
    pub fn numeric_projection(&self, field: NumericField) -> RepoResult<Vec<f64>> {
        self.repo.project_numeric(field)
    }

    /// Total number of stored records.
    pub fn student_count(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
