//! Error types for chat-completion requests

use serde::Deserialize;
use thiserror::Error;

/// Failure category of a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed endpoint/credential
    Configuration,
    /// DNS, connect, TLS or I/O failure, or a timeout
    Transport,
    /// The service rejected the credential
    Authentication,
    /// Unknown model, malformed messages or out-of-range parameters
    RequestValidation,
    /// The service throttled the caller or the quota is exhausted
    RateLimited,
    /// 5xx-class failure on the service side
    RemoteServer,
    /// The reply could not be decoded or carried no choices
    InvalidResponse,
}

impl ErrorKind {
    /// Short machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Authentication => "authentication",
            Self::RequestValidation => "request_validation",
            Self::RateLimited => "rate_limited",
            Self::RemoteServer => "remote_server",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    RequestValidation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    RemoteServer(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// Build an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Configuration => Self::Configuration(message),
            ErrorKind::Transport => Self::Transport(message),
            ErrorKind::Authentication => Self::Authentication(message),
            ErrorKind::RequestValidation => Self::RequestValidation(message),
            ErrorKind::RateLimited => Self::RateLimited(message),
            ErrorKind::RemoteServer => Self::RemoteServer(message),
            ErrorKind::InvalidResponse => Self::InvalidResponse(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::RequestValidation(_) => ErrorKind::RequestValidation,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::RemoteServer(_) => ErrorKind::RemoteServer,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }

    /// Build the error for a non-success HTTP reply
    ///
    /// The status decides the kind. For a generic 4xx an OpenAI-style error
    /// body refines it, e.g. a 400 carrying `invalid_api_key`. The description
    /// is the body's message, else the raw body text, else the status reason.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let api_error = serde_json::from_slice::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error);

        let kind = match (classify_status(status), &api_error) {
            (ErrorKind::RequestValidation, Some(api)) => {
                match classify_api_error(api.r#type.as_deref(), api.code(), api.message()) {
                    ErrorKind::RemoteServer => ErrorKind::RequestValidation,
                    refined => refined,
                }
            }
            (kind, _) => kind,
        };

        let detail = match &api_error {
            Some(api) if !api.message().is_empty() => api.message().to_string(),
            _ => {
                let text = String::from_utf8_lossy(body);
                let text = text.trim();
                if text.is_empty() {
                    reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or("no response body")
                        .to_string()
                } else {
                    truncate(text, MAX_BODY_CHARS)
                }
            }
        };

        Self::new(kind, format!("HTTP {}: {}", status, detail))
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", message))
        } else if err.is_decode() {
            Self::InvalidResponse(message)
        } else if let Some(status) = err.status() {
            Self::new(classify_status(status.as_u16()), message)
        } else {
            Self::Transport(message)
        }
    }
}

const MAX_BODY_CHARS: usize = 200;

/// `{"error": {...}}` as returned by OpenAI-compatible services
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// Some servers send numeric codes or omit the message.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    r#type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ApiErrorBody {
    fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    fn code(&self) -> Option<&str> {
        self.code.as_ref().and_then(|code| code.as_str())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Map an HTTP status code to an error kind
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Authentication,
        429 => ErrorKind::RateLimited,
        400..=499 => ErrorKind::RequestValidation,
        500..=599 => ErrorKind::RemoteServer,
        _ => ErrorKind::InvalidResponse,
    }
}

/// Map the `type`/`code` fields of an OpenAI-style error body to an error kind
///
/// Unrecognised bodies fall back to the message text and finally to
/// [`ErrorKind::RemoteServer`].
pub fn classify_api_error(
    error_type: Option<&str>,
    code: Option<&str>,
    message: &str,
) -> ErrorKind {
    let error_type = error_type.unwrap_or_default();
    let code = code.unwrap_or_default();

    // OpenAI reports a bad key as an invalid_request_error, so check auth first
    if code == "invalid_api_key"
        || error_type == "authentication_error"
        || error_type == "permission_error"
    {
        return ErrorKind::Authentication;
    }

    if matches!(code, "rate_limit_exceeded" | "insufficient_quota")
        || matches!(
            error_type,
            "rate_limit_error" | "insufficient_quota" | "requests" | "tokens"
        )
    {
        return ErrorKind::RateLimited;
    }

    if matches!(error_type, "server_error" | "api_error" | "overloaded_error") {
        return ErrorKind::RemoteServer;
    }

    if error_type == "invalid_request_error"
        || error_type == "not_found_error"
        || code == "model_not_found"
    {
        return ErrorKind::RequestValidation;
    }

    let message = message.to_lowercase();
    if message.contains("api key") || message.contains("unauthorized") {
        ErrorKind::Authentication
    } else if message.contains("rate limit") {
        ErrorKind::RateLimited
    } else if message.contains("model") && message.contains("not found") {
        ErrorKind::RequestValidation
    } else {
        ErrorKind::RemoteServer
    }
}

/// Join an error with its sources, e.g. `error sending request: connection refused`
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub type Result<T> = std::result::Result<T, CompletionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_api_key_is_authentication() {
        let kind = classify_api_error(
            Some("invalid_request_error"),
            Some("invalid_api_key"),
            "Incorrect API key provided",
        );
        assert_eq!(kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_unknown_model_is_request_validation() {
        let kind = classify_api_error(
            Some("invalid_request_error"),
            Some("model_not_found"),
            "The model `nope` does not exist",
        );
        assert_eq!(kind, ErrorKind::RequestValidation);
    }

    #[test]
    fn test_rate_limit_and_quota() {
        assert_eq!(
            classify_api_error(Some("requests"), Some("rate_limit_exceeded"), "slow down"),
            ErrorKind::RateLimited
        );
        assert_eq!(
            classify_api_error(Some("insufficient_quota"), None, "quota"),
            ErrorKind::RateLimited
        );
    }

    #[test]
    fn test_server_error_and_fallbacks() {
        assert_eq!(
            classify_api_error(Some("server_error"), None, "boom"),
            ErrorKind::RemoteServer
        );
        assert_eq!(
            classify_api_error(None, None, "Unauthorized"),
            ErrorKind::Authentication
        );
        assert_eq!(
            classify_api_error(None, None, "model llama not found"),
            ErrorKind::RequestValidation
        );
        assert_eq!(
            classify_api_error(None, None, "something broke"),
            ErrorKind::RemoteServer
        );
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(401), ErrorKind::Authentication);
        assert_eq!(classify_status(403), ErrorKind::Authentication);
        assert_eq!(classify_status(404), ErrorKind::RequestValidation);
        assert_eq!(classify_status(429), ErrorKind::RateLimited);
        assert_eq!(classify_status(503), ErrorKind::RemoteServer);
    }

    #[test]
    fn test_kind_round_trips_through_new() {
        let err = CompletionError::new(ErrorKind::Transport, "connection refused");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "Connection error: connection refused");
    }

    #[test]
    fn test_status_decides_kind_for_plain_bodies() {
        let cases: [(u16, &[u8], ErrorKind); 6] = [
            (401, b"Unauthorized", ErrorKind::Authentication),
            (401, b"", ErrorKind::Authentication),
            (403, b"Forbidden", ErrorKind::Authentication),
            (404, b"Not Found", ErrorKind::RequestValidation),
            (429, b"slow down", ErrorKind::RateLimited),
            (502, b"<html>bad gateway</html>", ErrorKind::RemoteServer),
        ];
        for (status, body, expected) in cases {
            let err = CompletionError::from_status(status, body);
            assert_eq!(err.kind(), expected, "status {}", status);
            assert!(err.to_string().contains(&format!("HTTP {}", status)));
        }
    }

    #[test]
    fn test_empty_body_uses_status_reason() {
        let err = CompletionError::from_status(401, b"");
        assert_eq!(err.to_string(), "Authentication failed: HTTP 401: Unauthorized");
    }

    #[test]
    fn test_error_body_refines_generic_4xx() {
        let body = br#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#;
        let err = CompletionError::from_status(400, body);
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().contains("Incorrect API key provided"));

        let unrecognised = br#"{"error":{"message":"nope","code":42}}"#;
        let err = CompletionError::from_status(400, unrecognised);
        assert_eq!(err.kind(), ErrorKind::RequestValidation);
    }

    #[test]
    fn test_status_wins_over_error_body() {
        let body = br#"{"error":{"message":"overloaded","type":"invalid_request_error"}}"#;
        assert_eq!(
            CompletionError::from_status(503, body).kind(),
            ErrorKind::RemoteServer
        );
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let err = CompletionError::from_status(500, body.as_bytes());
        assert!(err.to_string().len() < 300);
        assert!(err.to_string().ends_with("..."));
    }
}
