//! Constructor methods for ReplayError

use super::types::ReplayError;

impl ReplayError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create an IO error for a specific path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a log error for a whole file
    pub fn log_file(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
            path: Some(path.into()),
            line: None,
        }
    }

    /// Create a log error pointing at a line of a file
    pub fn log_at(message: impl Into<String>, path: impl Into<String>, line: usize) -> Self {
        Self::Log {
            message: message.into(),
            path: Some(path.into()),
            line: Some(line),
        }
    }

    /// Create a new safety mode error
    pub fn mode(message: impl Into<String>) -> Self {
        Self::Mode {
            message: message.into(),
        }
    }

    /// Create an invalid input error for a named field
    pub fn invalid_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
