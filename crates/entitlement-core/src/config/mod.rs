pub mod logging_config;
pub mod storage_config;
pub mod ticker_config;
pub mod trial_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{EntitlementError, EntitlementResult};

pub use logging_config::LoggingConfig;
pub use storage_config::StorageConfig;
pub use ticker_config::TickerConfig;
pub use trial_config::TrialConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EntitlementConfig {
    pub trial: TrialConfig,
    pub ticker: TickerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl EntitlementConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read, parse, and validate a TOML config file.
    pub fn load(path: &Path) -> EntitlementResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EntitlementError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)
            .map_err(|e| EntitlementError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EntitlementResult<()> {
        if self.trial.duration_ms <= 0 {
            return Err(EntitlementError::Config(format!(
                "trial.duration_ms must be positive, got {}",
                self.trial.duration_ms
            )));
        }
        if self.ticker.period_ms == 0 {
            return Err(EntitlementError::Config(
                "ticker.period_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
