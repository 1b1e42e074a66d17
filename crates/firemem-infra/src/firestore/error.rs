use firemem_types::error::MemoryError;
use firemem_types::status::StatusKind;
use thiserror::Error;

use super::wire::ErrorResponse;

/// Errors returned by the Firestore client binding.
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("cannot construct client: {0}")]
    Connection(String),

    #[error("{kind}: {message}")]
    Status { kind: StatusKind, message: String },

    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl FirestoreError {
    /// Classify a non-2xx response from its HTTP status and body.
    ///
    /// The body's canonical status name wins; the HTTP code is the fallback.
    pub fn from_response(http_status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => {
                let kind = parsed
                    .error
                    .status
                    .as_deref()
                    .and_then(StatusKind::from_name)
                    .unwrap_or_else(|| {
                        StatusKind::from_http(parsed.error.code.unwrap_or(http_status))
                    });
                Self::Status {
                    kind,
                    message: parsed.error.message,
                }
            }
            Err(_) => Self::Status {
                kind: StatusKind::from_http(http_status),
                message: format!("HTTP {http_status}: {body}"),
            },
        }
    }

    pub fn kind(&self) -> Option<StatusKind> {
        match self {
            Self::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(StatusKind::NotFound)
    }
}

impl From<FirestoreError> for MemoryError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Connection(message) => MemoryError::Connection(message),
            FirestoreError::Status { kind, message } => MemoryError::Status { kind, message },
            FirestoreError::Transport(e) if e.is_timeout() => MemoryError::DeadlineExceeded,
            FirestoreError::Transport(e) => MemoryError::Transport(e.to_string()),
            FirestoreError::Decode(message) => MemoryError::Decode(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_name_wins_over_http_code() {
        let body = r#"{"error": {"code": 400, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = FirestoreError::from_response(400, body);
        assert_eq!(err.kind(), Some(StatusKind::ResourceExhausted));
        assert_eq!(err.to_string(), "RESOURCE_EXHAUSTED: quota");
    }

    #[test]
    fn test_code_fallback_when_status_missing() {
        let body = r#"{"error": {"code": 404, "message": "gone"}}"#;
        let err = FirestoreError::from_response(500, body);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unparseable_body_uses_http_status() {
        let err = FirestoreError::from_response(503, "<html>bad gateway</html>");
        assert_eq!(err.kind(), Some(StatusKind::Unavailable));
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_into_memory_error() {
        let err: MemoryError = FirestoreError::Status {
            kind: StatusKind::PermissionDenied,
            message: "denied".to_string(),
        }
        .into();
        assert_eq!(err.status_kind(), Some(StatusKind::PermissionDenied));

        let err: MemoryError = FirestoreError::Connection("no credentials".to_string()).into();
        assert!(matches!(err, MemoryError::Connection(_)));
    }
}
