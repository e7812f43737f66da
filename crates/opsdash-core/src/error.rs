//! Unified error types for opsdash

use thiserror::Error;

/// Unified error type for all opsdash operations
#[derive(Error, Debug)]
pub enum DashError {
    /// Required configuration for a source is absent. The source is disabled,
    /// not retried; logged once at startup.
    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    /// Network/5xx/timeout while talking to a backend. The source's panel is
    /// empty for this cycle; the next tick retries automatically.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// A backend returned data the normalizer cannot classify. The row is
    /// skipped, never fatal to the cycle.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Terminal setup, rendering, or event handling failure. The display is
    /// unusable, so this is the only class that reaches the process boundary.
    #[error("terminal error: {0}")]
    Terminal(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl DashError {
    /// Whether this error means "source disabled" as opposed to a transient
    /// failure worth retrying on the next tick.
    pub fn is_config_missing(&self) -> bool {
        matches!(self, DashError::ConfigMissing(_))
    }
}

/// Result type alias using DashError
pub type Result<T> = std::result::Result<T, DashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_is_distinct_from_fetch() {
        let disabled = DashError::ConfigMissing("travis token".to_string());
        let transient = DashError::Fetch("connection refused".to_string());
        assert!(disabled.is_config_missing());
        assert!(!transient.is_config_missing());
    }

    #[test]
    fn test_error_display() {
        let err = DashError::Fetch("503 from jenkins".to_string());
        assert_eq!(err.to_string(), "fetch failed: 503 from jenkins");
    }
}
