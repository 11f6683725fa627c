//! Standardized conversion of HTTP and network failures into [`RegistryError`]

use crate::error::RegistryError;

/// Standard error handler for non-success HTTP responses
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Build the status error for a failed registry operation
    pub fn handle_registry_error(status: u16, operation: &str) -> RegistryError {
        RegistryError::Status {
            operation: operation.to_string(),
            status,
        }
    }

    /// Short human hint for common registry statuses, used in log output
    pub fn describe_status(status: u16) -> &'static str {
        match status {
            401 => "unauthorized",
            403 => "forbidden",
            404 => "not found",
            405 => "method not allowed (deletion may be disabled)",
            429 => "rate limited",
            500 => "registry server error",
            502 | 503 => "registry unavailable",
            _ => "unexpected status",
        }
    }
}

/// Network error categorization and handling
pub struct NetworkErrorHandler;

impl NetworkErrorHandler {
    /// Categorize and format network errors with helpful context
    pub fn handle_network_error(error: &reqwest::Error, context: &str) -> RegistryError {
        let text = error.to_string();
        if error.is_timeout() {
            RegistryError::Transport(format!("{} timeout: {}", context, error))
        } else if error.is_connect() {
            RegistryError::Transport(format!("Connection error during {}: {}", context, error))
        } else if text.contains("dns") {
            RegistryError::Transport(format!("DNS resolution error for {}: {}", context, error))
        } else if text.contains("certificate") {
            RegistryError::Transport(format!(
                "TLS certificate error during {}: {}",
                context, error
            ))
        } else {
            RegistryError::Transport(format!("{} network error: {}", context, error))
        }
    }
}
