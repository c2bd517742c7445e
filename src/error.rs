//! Custom error types for animevsub-provider.
//!
//! Episode lookups fail loudly with one of these variants; the search path
//! never surfaces them and degrades to an empty list instead.

use std::error::Error;
use std::fmt;
use std::io;

/// Application error types.
#[derive(Debug)]
pub enum AppError {
    /// No episodes exist for the requested media
    NotFound(String),
    /// Non-2xx response or transport failure from the catalog API
    Upstream {
        /// HTTP status, absent for transport failures
        status: Option<u16>,
        /// Reason phrase or transport error message
        reason: String,
    },
    /// Invalid input from the caller
    InvalidInput(String),
    /// API response parsing errors
    Parse(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(io::Error),
}

impl AppError {
    /// Build an upstream error from an HTTP status.
    pub fn upstream_status(status: reqwest::StatusCode) -> Self {
        AppError::Upstream {
            status: Some(status.as_u16()),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Upstream {
                status: Some(status),
                reason,
            } => write!(f, "Upstream error: {} {}", status, reason),
            AppError::Upstream {
                status: None,
                reason,
            } => write!(f, "Upstream error: {}", reason),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return AppError::Parse(err.to_string());
        }
        AppError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
