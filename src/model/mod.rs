//! Domain records persisted by the configuration store.
//!
//! # Responsibility
//! - Define the three record kinds: settings, the configuration singleton
//!   and plugin records.
//!
//! # Invariants
//! - Within each record kind the identity field is unique.
//! - The three namespaces are independent of each other.

pub mod configuration;
pub mod plugin;
pub mod setting;
