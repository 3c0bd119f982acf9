//! Countdown ticker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TickerConfig {
    pub period_ms: u64,
}

impl TickerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.max(1))
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self { period_ms: 1_000 }
    }
}
