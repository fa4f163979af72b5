//! Core error type

use thiserror::Error;

/// Result type alias for Safety Replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Main error type for Safety Replay
#[derive(Error, Debug, Clone)]
pub enum ReplayError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// HTTP transport errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// Log file could not be read or decoded
    #[error("Log error: {message}")]
    Log {
        message: String,
        path: Option<String>,
        line: Option<usize>,
    },

    /// Safety mode could not be resolved to hooks
    #[error("Safety mode error: {message}")]
    Mode { message: String },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// One or more test cases failed
    #[error("{failed} of {total} replay case(s) failed: {summary}")]
    CasesFailed {
        failed: usize,
        total: usize,
        summary: String,
    },

    /// Generic errors
    #[error("{message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cases_failed_display() {
        let err = ReplayError::CasesFailed {
            failed: 1,
            total: 2,
            summary: "replay failed on routeX".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "1 of 2 replay case(s) failed: replay failed on routeX"
        );
    }
}
