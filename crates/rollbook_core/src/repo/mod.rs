//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/controller orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `NewStudent::validate()` before persistence.
//! - Repositories refuse connections that skipped schema bootstrap.

pub mod student_repo;
