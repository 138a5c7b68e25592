//! Embedded configuration store for a single-process service.
//!
//! Persists three kinds of records in one file-backed database: named
//! string settings, a composite configuration singleton and per-plugin
//! configuration records. This crate is the single source of truth for
//! the consistency rules around those records.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::configuration::Configuration;
pub use model::plugin::Plugin;
pub use model::setting::Setting;
pub use repo::config_repo::{
    ConfigurationRepository, RepoError, RepoResult, SqliteConfigurationRepository, DEFAULT_DB_FILE,
};
