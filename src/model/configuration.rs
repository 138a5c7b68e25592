//! Composite service configuration singleton.

use serde::{Deserialize, Serialize};

/// The one composite configuration record.
///
/// At most one instance exists at a time; saving replaces the previous
/// record wholesale, never merging fields. The individual fields are
/// opaque to the store itself — they belong to the surrounding service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub appliance_address: Option<String>,
    pub client_certificate_thumbprint: Option<String>,
    pub api_version: Option<u32>,
    pub ignore_ssl: Option<bool>,
    pub user_name: Option<String>,
    pub user_display_name: Option<String>,
    #[serde(default)]
    pub admin_roles: Vec<String>,
}
