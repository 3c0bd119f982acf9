//! Subscriber setup for binaries and test harnesses embedding the engine.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a global fmt subscriber. `RUST_LOG` overrides `config.level`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}
