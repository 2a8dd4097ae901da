//! Error types for mure.
//!
//! Per the error handling policy, request-level failures (transport,
//! cache) never surface as `Result::Err` — they become data (a synthetic
//! [`crate::response::ResponseRecord`] or a silent cache miss). Only
//! construction-boundary mistakes and JSON decoding failures are
//! represented here.

/// Errors raised at the construction boundary, before any worker starts.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("resource is missing a URL")]
    MissingUrl,

    #[error("resource is missing an HTTP method")]
    MissingMethod,

    #[error("batch_size must be at least 1, got {0}")]
    InvalidBatchSize(usize),
}

/// Top-level error type. The only variant callers of [`crate::drive`] and
/// the per-method convenience constructors ever see.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("failed to build http client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Raised by [`crate::response::ResponseRecord::json`] when the body does
/// not parse as JSON. Deferred: the transport call itself never fails for
/// this reason.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode response body as JSON: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_error_messages_are_descriptive() {
        assert_eq!(
            UsageError::MissingUrl.to_string(),
            "resource is missing a URL"
        );
        assert_eq!(
            UsageError::InvalidBatchSize(0).to_string(),
            "batch_size must be at least 1, got 0"
        );
    }

    #[test]
    fn error_wraps_usage_error() {
        let err: Error = UsageError::MissingMethod.into();
        assert!(matches!(err, Error::Usage(UsageError::MissingMethod)));
    }
}
