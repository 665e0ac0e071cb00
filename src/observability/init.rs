//! Tracing initialization and subscriber setup.
//!
//! This module configures the tracing subscriber that carries the crate's
//! structured events and spans. Filtering follows the configured trace level.

use crate::Config;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// Builds a formatting subscriber filtered by the configured level and
/// installs it as the global default.
///
/// # Trace Level Resolution
///
/// Level is determined by:
/// 1. The `RUST_LOG` environment variable, if set
/// 2. `config.trace_level` if set
/// 3. Default: `"info"`
///
/// # Initialization Behavior
///
/// Idempotent: safe to call multiple times (only the first call takes effect).
///
/// # Example
///
/// ```rust
/// use reelrank::observability::init_tracing;
/// use reelrank::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = config
        .trace_level
        .clone()
        .unwrap_or_else(|| "info".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
