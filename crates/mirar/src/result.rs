//! Result and error types for Mirar.

use thiserror::Error;

/// Result type for Mirar operations
pub type MirarResult<T> = Result<T, MirarError>;

/// Errors that can occur in Mirar
#[derive(Debug, Error)]
pub enum MirarError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page creation or page-level session error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// DOM probe fault (single candidate resolution failure)
    #[error("Probe failed: {message}")]
    Probe {
        /// Error message
        message: String,
    },

    /// Element activation (click) error
    #[error("Activation failed: {message}")]
    Activation {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MirarError {
    /// Create a browser launch error
    #[must_use]
    pub fn browser_launch(message: impl Into<String>) -> Self {
        Self::BrowserLaunch {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Create a navigation error
    #[must_use]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a probe error
    #[must_use]
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    /// Create an activation error
    #[must_use]
    pub fn activation(message: impl Into<String>) -> Self {
        Self::Activation {
            message: message.into(),
        }
    }

    /// Create a screenshot error
    #[must_use]
    pub fn screenshot(message: impl Into<String>) -> Self {
        Self::Screenshot {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_error_display() {
        let err = MirarError::navigation("http://localhost:5173/", "connection refused");
        let rendered = err.to_string();
        assert!(rendered.contains("http://localhost:5173/"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MirarError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }

    #[test]
    fn test_timeout_display() {
        let err = MirarError::Timeout { ms: 30_000 };
        assert!(err.to_string().contains("30000ms"));
    }
}
