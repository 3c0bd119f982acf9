//! Trial window configuration.

use serde::{Deserialize, Serialize};

use crate::types::{EpochMillis, TRIAL_DURATION_MS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrialConfig {
    /// Length of the granted window in milliseconds.
    pub duration_ms: EpochMillis,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            duration_ms: TRIAL_DURATION_MS,
        }
    }
}
