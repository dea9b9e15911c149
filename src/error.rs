//! Domain-specific error types for transparency-portal

use thiserror::Error;

/// Main error type for the portal and corridor helpers
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {message}")]
    Transport { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Render error: {message}")]
    Render { message: String },
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PortalError::Serialization {
                message: format!("Invalid response body: {}", err),
            }
        } else {
            PortalError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PortalError {
    fn from(err: toml::de::Error) -> Self {
        PortalError::Config {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Render {
            message: err.to_string(),
        }
    }
}

/// Result type alias for portal operations
pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_matches_status_line_format() {
        let err = PortalError::Http {
            status: 503,
            body: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: upstream down");
    }

    #[test]
    fn json_errors_become_serialization() {
        let err: PortalError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, PortalError::Serialization { .. }));
    }
}
