//! Plugin configuration record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Configuration record for one registered plugin.
///
/// Identity is `name`; a plugin name implies nothing about settings of the
/// same name. The `configuration` map carries whatever structured values
/// the plugin defines for itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub configuration: BTreeMap<String, Value>,
}

impl Plugin {
    /// Creates a disabled plugin record with an empty configuration map.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            enabled: false,
            configuration: BTreeMap::new(),
        }
    }
}
