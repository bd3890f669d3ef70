use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the remote data client. Nothing here is retried;
/// call sites decide whether to show inline text, an alert, or nothing.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("local storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN))
    }
}

/// Extracts the human-readable message from an error body. Express backends
/// answer with `{"message": ..}` or `{"error": ..}`; anything else is echoed.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(m) = v.get(key).and_then(|m| m.as_str()) {
                return m.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() { "no response body".to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
mod tests {
    use super::error_message;

    #[test]
    fn picks_message_field() {
        assert_eq!(error_message(r#"{"message":"forbidden access"}"#), "forbidden access");
        assert_eq!(error_message(r#"{"error":"nope"}"#), "nope");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message("  "), "no response body");
    }
}
