//! Storage configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite file. `None` keeps records in memory.
    pub db_path: Option<String>,
}
