//! Student record domain model.
//!
//! # Responsibility
//! - Define the record shape shared by storage, export and charts.
//! - Own input coercion from raw form text into typed records.
//!
//! # Invariants
//! - Every stored record is identified by a store-assigned `StudentId`.
//! - Records are immutable once created; deletion is a hard delete.

pub mod student;
