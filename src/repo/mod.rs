//! Repository layer contract and persistence implementation.
//!
//! # Responsibility
//! - Define the data-access contract for configuration records.
//! - Isolate SQLite query details from the callers of the store.
//!
//! # Invariants
//! - Absence of a requested record is `Ok(None)`, never an error.
//! - Every operation on a closed store fails with `RepoError::Closed`.

pub mod config_repo;
