//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario execution error
    #[error("Scenario failed: {message}")]
    ScenarioExecution {
        /// Error message
        message: String,
    },

    /// Mirar library error
    #[error("Mirar error: {0}")]
    Mirar(#[from] mirar::MirarError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a scenario execution error
    #[must_use]
    pub fn scenario_execution(message: impl Into<String>) -> Self {
        Self::ScenarioExecution {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_scenario_execution_error() {
        let err = CliError::scenario_execution("scenario failed");
        assert!(err.to_string().contains("Scenario failed"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }

    #[test]
    fn test_mirar_error_from() {
        let err: CliError = mirar::MirarError::browser_launch("no chromium").into();
        assert!(err.to_string().contains("no chromium"));
    }
}
