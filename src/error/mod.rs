//! Error types for registry operations

pub mod handlers;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Connection, DNS, TLS or timeout failure; never retried
    #[error("Transport error: {0}")]
    Transport(String),
    /// Stored `auth` credential is not base64 `user:pass`
    #[error("Authentication decode error: {0}")]
    AuthDecode(String),
    /// Registry answered with a non-success status
    #[error("{operation} failed: registry returned status {status}")]
    Status { operation: String, status: u16 },
    /// Response body does not match the expected JSON shape
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl RegistryError {
    /// HTTP status carried by a [`RegistryError::Status`]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RegistryError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Prefix the message with where the failure happened
    pub fn context(self, context: &str) -> Self {
        match self {
            RegistryError::Transport(msg) => RegistryError::Transport(format!("{}: {}", context, msg)),
            RegistryError::AuthDecode(msg) => {
                RegistryError::AuthDecode(format!("{}: {}", context, msg))
            }
            RegistryError::Decode(msg) => RegistryError::Decode(format!("{}: {}", context, msg)),
            RegistryError::Config(msg) => RegistryError::Config(format!("{}: {}", context, msg)),
            RegistryError::Io(msg) => RegistryError::Io(format!("{}: {}", context, msg)),
            RegistryError::Validation(msg) => {
                RegistryError::Validation(format!("{}: {}", context, msg))
            }
            status @ RegistryError::Status { .. } => status,
        }
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for RegistryError {
    fn from(err: serde_yaml::Error) -> Self {
        RegistryError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for RegistryError {
    fn from(err: url::ParseError) -> Self {
        RegistryError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reports_operation_and_code() {
        let err = RegistryError::Status {
            operation: "catalog".to_string(),
            status: 503,
        };
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.to_string(), "catalog failed: registry returned status 503");
    }

    #[test]
    fn context_prefixes_message_but_keeps_status_intact() {
        let err = RegistryError::Decode("missing field".to_string()).context("tags for app");
        assert_eq!(err.to_string(), "Decode error: tags for app: missing field");

        let status = RegistryError::Status {
            operation: "blob".to_string(),
            status: 404,
        }
        .context("ignored");
        assert_eq!(status.status_code(), Some(404));
    }
}
