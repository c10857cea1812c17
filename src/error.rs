//! Error types surfaced by the engine client.

use reqwest::StatusCode;

/// Unified shape for every HTTP-level failure reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    /// HTTP status code, always in the 400..=599 range.
    pub status_code: u16,
    /// Short label for the status, e.g. "Not Found".
    pub error: String,
    /// Serialized response body.
    pub message: String,
}

impl NormalizedError {
    /// Builds an error for `status` with the conventional label for that code.
    ///
    /// Codes outside the error range cannot be represented and become 500.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let status_code = if (400..=599).contains(&status) {
            status
        } else {
            500
        };
        Self {
            status_code,
            error: status_label(status_code).to_string(),
            message: message.into(),
        }
    }

    /// Same as [`NormalizedError::new`] but keeps a server supplied label.
    pub fn with_label(status: u16, label: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new(status, message);
        if err.status_code == status {
            err.error = label.into();
        }
        err
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == StatusCode::UNAUTHORIZED.as_u16()
    }
}

/// Conventional reason phrase for a status code.
pub fn status_label(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

impl std::fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status_code, self.error, self.message)
    }
}

impl std::error::Error for NormalizedError {}

/// Errors returned by [`crate::client::EngineClient`].
#[derive(Debug)]
pub enum EngineError {
    /// The transport failed before any response was produced. The inner
    /// error is exactly what the transport returned.
    Transport(anyhow::Error),
    /// The engine answered with an error status.
    Http(NormalizedError),
    /// The auth endpoint answered 2xx but without usable credentials.
    InvalidAuthResponse(String),
}

impl EngineError {
    /// The status code for HTTP-level failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            EngineError::Http(err) => Some(err.status_code),
            _ => None,
        }
    }

    pub fn as_normalized(&self) -> Option<&NormalizedError> {
        match self {
            EngineError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Transport(err) => write!(f, "Transport error: {:#}", err),
            EngineError::Http(err) => write!(f, "Engine error: {}", err),
            EngineError::InvalidAuthResponse(msg) => {
                write!(f, "Invalid auth response: {}", msg)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Transport(err) => Some(&**err),
            EngineError::Http(err) => Some(err),
            EngineError::InvalidAuthResponse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_error_uses_canonical_label() {
        let err = NormalizedError::new(404, "{}");
        assert_eq!(err.status_code, 404);
        assert_eq!(err.error, "Not Found");
        assert_eq!(err.message, "{}");
    }

    #[test]
    fn test_normalized_error_coerces_non_error_status() {
        let err = NormalizedError::new(200, "ok");
        assert_eq!(err.status_code, 500);
        assert_eq!(err.error, "Internal Server Error");

        let err = NormalizedError::new(999, "x");
        assert_eq!(err.status_code, 500);
    }

    #[test]
    fn test_with_label_keeps_server_label() {
        let err = NormalizedError::with_label(418, "Teapot", "body");
        assert_eq!(err.error, "Teapot");

        // Label is dropped when the status had to be coerced
        let err = NormalizedError::with_label(302, "Found", "body");
        assert_eq!(err.status_code, 500);
        assert_eq!(err.error, "Internal Server Error");
    }

    #[test]
    fn test_status_label_unknown() {
        assert_eq!(status_label(599), "Unknown");
        assert_eq!(status_label(401), "Unauthorized");
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Http(NormalizedError::new(503, "\"down\""));
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service Unavailable"));
        assert_eq!(err.status_code(), Some(503));

        let err = EngineError::Transport(anyhow::anyhow!("connection refused"));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.status_code(), None);
        assert!(err.as_normalized().is_none());
    }
}
