use thiserror::Error;

/// Message used when a failed response carries no `message` field.
pub const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in - no access token available")]
    MissingCredential,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unauthorized - session expired")]
    Unauthorized,

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("{message} (status {status})")]
    Application { status: u16, message: String },

    #[error("Credential store error: {0}")]
    Store(String),
}

/// Coarse failure kind, for callers that only branch on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MissingCredential,
    Transport,
    Unauthorized,
    Decode,
    Application,
    Store,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }

    /// Build a decode failure quoting (a prefix of) the offending body.
    pub fn decode(err: &serde_json::Error, body: &str) -> Self {
        ApiError::Decode(format!("{}: {}", err, Self::truncate_body(body)))
    }

    /// Build an application failure from a decoded error body.
    ///
    /// The message comes from a string `message` field when present.
    pub fn from_body(status: reqwest::StatusCode, body: &serde_json::Value) -> Self {
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string();
        ApiError::Application {
            status: status.as_u16(),
            message,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::MissingCredential => ErrorCategory::MissingCredential,
            ApiError::Transport(_) => ErrorCategory::Transport,
            ApiError::Unauthorized => ErrorCategory::Unauthorized,
            ApiError::Decode(_) => ErrorCategory::Decode,
            ApiError::Application { .. } => ErrorCategory::Application,
            ApiError::Store(_) => ErrorCategory::Store,
        }
    }

    /// Human-readable message without the status suffix.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Application { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Store(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_from_body_uses_message_field() {
        let err = ApiError::from_body(StatusCode::BAD_REQUEST, &json!({"message": "Title required"}));
        assert_eq!(err.category(), ErrorCategory::Application);
        assert_eq!(err.user_message(), "Title required");
        assert_eq!(err.to_string(), "Title required (status 400)");
    }

    #[test]
    fn test_from_body_falls_back_without_message() {
        let err = ApiError::from_body(StatusCode::INTERNAL_SERVER_ERROR, &json!({"error": "boom"}));
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);

        // Non-string message is ignored too
        let err = ApiError::from_body(StatusCode::CONFLICT, &json!({"message": 42}));
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);

        let err = ApiError::from_body(StatusCode::CONFLICT, &json!([1, 2]));
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with(&format!("(truncated, {} total bytes)", long.len())));
    }

    #[test]
    fn test_store_error_from_anyhow() {
        let err: ApiError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.category(), ErrorCategory::Store);
        assert!(err.to_string().contains("disk full"));
    }
}
