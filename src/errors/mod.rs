//! Error handling module for the trending catalog.
//!
//! Provides the centralized error type with stable codes and a mapping to process exit codes.

use std::path::Path;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const FILESYSTEM_ERROR: &str = "FILESYSTEM_ERROR";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const REMOTE_ERROR: &str = "REMOTE_ERROR";
    pub const REVISION_CONFLICT: &str = "REVISION_CONFLICT";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Exit code used when a run finished but a non-fatal stage reported a failure.
pub const EXIT_DEGRADED: i32 = 8;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed configuration
    Config(String),
    /// Local directory creation, read or write failure
    Filesystem { path: String, message: String },
    /// Upstream aggregation service unreachable or malformed
    Upstream(String),
    /// Remote repository API failure (bad credential, unexpected status, ...)
    Remote { status: Option<u16>, message: String },
    /// Stale or missing revision marker on a remote write
    Conflict { path: String, message: String },
    /// A network call or the whole run exceeded its deadline
    Timeout(String),
    /// Anything else
    Internal(String),
}

impl AppError {
    /// Build a filesystem error carrying the path it happened on.
    pub fn filesystem(path: &Path, err: impl std::fmt::Display) -> Self {
        AppError::Filesystem {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Build a remote error from an HTTP status and message.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        AppError::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Filesystem { .. } => codes::FILESYSTEM_ERROR,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::Remote { .. } => codes::REMOTE_ERROR,
            AppError::Conflict { .. } => codes::REVISION_CONFLICT,
            AppError::Timeout(_) => codes::TIMEOUT,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Internal(_) => 1,
            AppError::Config(_) => 2,
            AppError::Filesystem { .. } => 3,
            AppError::Remote { .. } => 4,
            AppError::Conflict { .. } => 5,
            AppError::Timeout(_) => 6,
            AppError::Upstream(_) => 7,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Config(msg) => msg.clone(),
            AppError::Filesystem { path, message } => format!("{} ({})", message, path),
            AppError::Upstream(msg) => msg.clone(),
            AppError::Remote {
                status: Some(status),
                message,
            } => format!("HTTP {}: {}", status, message),
            AppError::Remote {
                status: None,
                message,
            } => message.clone(),
            AppError::Conflict { path, message } => format!("{} ({})", message, path),
            AppError::Timeout(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::debug!("HTTP client error: {:?}", err);
        if err.is_timeout() {
            return AppError::Timeout(format!("Request timed out: {}", err));
        }
        AppError::Remote {
            status: err.status().map(|s| s.as_u16()),
            message: format!("HTTP error: {}", err),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout("Run deadline exceeded".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_and_non_zero() {
        let errors = [
            AppError::Internal("x".into()),
            AppError::Config("x".into()),
            AppError::filesystem(Path::new("/tmp/x"), "denied"),
            AppError::remote(401, "Bad credentials"),
            AppError::Conflict {
                path: "README.md".into(),
                message: "sha mismatch".into(),
            },
            AppError::Timeout("x".into()),
            AppError::Upstream("x".into()),
        ];

        let mut seen: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(seen.iter().all(|c| *c != 0 && *c != EXIT_DEGRADED));
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), errors.len());
    }

    #[test]
    fn test_filesystem_error_carries_path() {
        let err = AppError::filesystem(Path::new("trending/2024-01-01/pepe"), "permission denied");
        let rendered = err.to_string();
        assert!(rendered.starts_with("FILESYSTEM_ERROR"));
        assert!(rendered.contains("trending/2024-01-01/pepe"));
        assert!(rendered.contains("permission denied"));
    }

    #[test]
    fn test_remote_error_display() {
        let err = AppError::remote(403, "Resource not accessible");
        assert_eq!(
            err.to_string(),
            "REMOTE_ERROR: HTTP 403: Resource not accessible"
        );
    }
}
