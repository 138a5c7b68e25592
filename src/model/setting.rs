//! Named string setting record.

use serde::{Deserialize, Serialize};

/// A single named setting.
///
/// Identity is `name`; writes replace the whole record. The store never
/// persists a missing value, so `value` is a plain `String` and an "unset"
/// write lands as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
}

impl Setting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
