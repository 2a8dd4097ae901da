//! Driver configuration and environment-derived tunables.

use std::time::Duration;

/// Number of requests dispatched concurrently when the caller doesn't
/// specify one explicitly (§6).
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Per-request timeout applied when [`crate::request::RequestRecord::timeout_seconds`]
/// is `None` (§3, §4.5).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the environment variable that enables error logging of
/// transport failures to stderr (§6).
const LOG_ERRORS_ENV_VAR: &str = "MURE_LOG_ERRORS";

/// Runtime configuration for a [`crate::dispatcher::Dispatcher`].
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Maximum number of concurrent in-flight HTTP sends.
    pub batch_size: usize,
    /// Per-request timeout used when a request doesn't specify its own.
    pub default_timeout: Duration,
    /// Whether transport failures are logged to stderr via `tracing::error!`.
    pub log_errors: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            default_timeout: DEFAULT_TIMEOUT,
            log_errors: log_errors_enabled(),
        }
    }
}

impl DriverConfig {
    /// Build a config with an explicit batch size, reading `MURE_LOG_ERRORS`
    /// from the environment for the logging toggle.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }
}

/// Whether `MURE_LOG_ERRORS` is set to a truthy value.
///
/// Any non-empty value is truthy, including `"0"` or `"false"` — this
/// matches a plain presence check rather than parsing booleans.
pub(crate) fn log_errors_enabled() -> bool {
    std::env::var(LOG_ERRORS_ENV_VAR).is_ok_and(|v| !v.is_empty())
}
