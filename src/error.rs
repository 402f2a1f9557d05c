//! Error types for report-sync
//!
//! The taxonomy separates operator-actionable configuration errors (bad
//! credentials, unsupported report/account combinations, exhausted retries)
//! from transient transport failures that the retry layer recovers from
//! internally.

use thiserror::Error;

/// Result type alias for report-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for report-sync
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-category error: the caller cannot fix this by a code
    /// change. Covers non-retryable 4xx responses, retry-ceiling exhaustion
    /// and aggregated per-slice job failures.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the issue
        message: String,
    },

    /// Retryable server-side HTTP failure (500, 502, 503, 504)
    #[error("HTTP status {status}: {message}")]
    Http {
        /// The HTTP status code returned by the server
        status: u16,
        /// Response body or status text for diagnosis
        message: String,
    },

    /// Connection-level network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A report job reached the FATAL terminal status.
    ///
    /// Carries the slice's time window so the operator can see exactly which
    /// sub-range of the sync could not be generated.
    #[error(
        "report job for '{report_type}' failed with FATAL status for slice \
         {{start_time: '{start_time}', end_time: '{end_time}'}}"
    )]
    JobFailed {
        /// The report type whose generation job failed
        report_type: String,
        /// Start of the slice time window (RFC 3339)
        start_time: String,
        /// End of the slice time window (RFC 3339)
        end_time: String,
    },

    /// Document decoding failed (malformed CSV/XML/JSON, bad gzip stream)
    #[error("decode error: {0}")]
    Decode(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error from a message
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_failed_display_includes_slice_window_bounds() {
        let err = Error::JobFailed {
            report_type: "GET_SELLER_FEEDBACK_DATA".into(),
            start_time: "2023-01-01T00:00:00Z".into(),
            end_time: "2023-01-30T00:00:00Z".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FATAL"));
        assert!(msg.contains("start_time: '2023-01-01T00:00:00Z'"));
        assert!(msg.contains("end_time: '2023-01-30T00:00:00Z'"));
    }

    #[test]
    fn config_error_display_prefixes_category() {
        let err = Error::config("Forbidden. You don't have permission to access this resource.");
        assert_eq!(
            err.to_string(),
            "configuration error: Forbidden. You don't have permission to access this resource."
        );
    }

    #[test]
    fn http_error_display_includes_status() {
        let err = Error::Http {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert!(err.to_string().contains("503"));
    }
}
