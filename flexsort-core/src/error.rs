//! Error types for flexsort-core

use thiserror::Error;

/// Error type for engine operations
#[derive(Debug, Error)]
pub enum FlexSortError {
    /// Configuration rejected at session construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A response was submitted after the final block finished
    #[error("Session already complete")]
    SessionComplete,

    /// A result was requested before every trial was recorded
    #[error("Session incomplete: {submitted} of {expected} trials recorded")]
    SessionIncomplete { submitted: usize, expected: usize },

    /// A recorded trial arrived out of sequence
    #[error("Trial out of order: expected trial {expected}, got {got}")]
    OutOfOrder { expected: u32, got: u32 },

    /// Choice does not name one of the reference cards
    #[error("Invalid choice: {0} (expected a reference card index 0-3)")]
    InvalidChoice(u8),

    /// Response time is negative or not a finite number
    #[error("Invalid response time: {0}")]
    InvalidResponseTime(f64),

    /// A replayed trial does not match the label the engine derives for it
    #[error("Replay mismatch at trial {trial_number}: {reason}")]
    ReplayMismatch { trial_number: u32, reason: String },

    /// Report tier string is not recognized
    #[error("Unknown report tier: {0}")]
    UnknownTier(String),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, FlexSortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlexSortError::SessionIncomplete {
            submitted: 12,
            expected: 36,
        };
        assert_eq!(
            err.to_string(),
            "Session incomplete: 12 of 36 trials recorded"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FlexSortError = io_err.into();
        assert!(matches!(err, FlexSortError::Io(_)));
    }

    #[test]
    fn test_out_of_order_display() {
        let err = FlexSortError::OutOfOrder {
            expected: 4,
            got: 6,
        };
        assert!(err.to_string().contains("expected trial 4"));
    }
}
