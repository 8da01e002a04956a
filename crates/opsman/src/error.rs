//! Error types for platform API operations.
//!
//! Errors are categorized so the CLI can give the operator a short
//! description and actionable advice.

use std::fmt;

/// Result type alias for platform API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The platform could not be reached or timed out.
    Network,
    /// Credentials were rejected or the token could not be obtained.
    Auth,
    /// A product or endpoint does not exist.
    NotFound,
    /// Client configuration is incomplete.
    Config,
    /// The platform answered with something unexpected.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Platform unreachable",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Resource not found",
            Self::Config => "Invalid configuration",
            Self::Format => "Unexpected API response",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the target URL and network access, or pass --skip-ssl-validation for self-signed certificates",
            Self::Auth => "Verify the username/password or client id/secret",
            Self::NotFound => "Check the product slug with `omen list-tiles`",
            Self::Config => "Set the missing value by flag, environment variable or config file",
            Self::Format => "The platform version may not be supported",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the platform.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform answered with a non-success status.
    #[error("{method} {path} returned {status}: {body}")]
    Http {
        /// HTTP method.
        method: String,
        /// API path.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ureq::Error),

    /// Token acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A response could not be decoded.
    #[error("could not decode {what}: {message}")]
    Decode {
        /// What was being decoded.
        what: String,
        /// Decoder message.
        message: String,
    },

    /// Client configuration is incomplete.
    #[error("{0}")]
    InvalidConfig(String),

    /// A product slug is not installed.
    #[error("product {0} not found")]
    ProductNotFound(String),
}

impl Error {
    /// Create a decode error with context.
    pub fn decode(what: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Decode {
            what: what.into(),
            message: err.to_string(),
        }
    }

    /// Get the error category for user feedback.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http { status, .. } => match status {
                401 | 403 => ErrorCategory::Auth,
                404 => ErrorCategory::NotFound,
                _ => ErrorCategory::Other,
            },
            Error::Request(_) => ErrorCategory::Network,
            Error::Auth(_) => ErrorCategory::Auth,
            Error::Decode { .. } => ErrorCategory::Format,
            Error::InvalidConfig(_) => ErrorCategory::Config,
            Error::ProductNotFound(_) => ErrorCategory::NotFound,
        }
    }
}
