//! One-shot completion request and its presentation

use std::io::{self, Write};

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::{ChatMessage, ChatRequest, ModelClient};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a strategic reasoner.";
pub const DEFAULT_USER_PROMPT: &str = "What is the purpose of life?";

/// The demonstration conversation: default model, one system and one user turn
pub fn default_request() -> ChatRequest {
    ChatRequest::default()
        .with_message(ChatMessage::system(DEFAULT_SYSTEM_PROMPT))
        .with_message(ChatMessage::user(DEFAULT_USER_PROMPT))
}

/// Build a client for `config` and send `request` once
///
/// Configuration and request problems are reported before any network
/// traffic. The error keeps its [`ErrorKind`](crate::ErrorKind) so callers can
/// branch on it; flattening happens only in [`report`].
pub async fn request_completion(config: ClientConfig, request: ChatRequest) -> Result<String> {
    let client = ModelClient::new(config)?;
    client.complete(request).await
}

/// Write the outcome as a single line: the reply text or `Error: <description>`
pub fn report<W: Write>(result: &Result<String>, out: &mut W) -> io::Result<()> {
    match result {
        Ok(text) => writeln!(out, "{}", text)?,
        Err(err) => {
            debug!(kind = err.kind().as_str(), "reporting failure");
            let description = err.to_string().replace(['\r', '\n'], " ");
            writeln!(out, "Error: {}", description)?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompletionError, ErrorKind};
    use crate::model::Role;

    #[test]
    fn test_default_request() {
        let request = default_request();
        assert_eq!(request.model, "Meta-Llama-3-8B-Instruct-Q5_K_M");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, DEFAULT_USER_PROMPT);
        assert_eq!(request.max_tokens, 500);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_report_success_is_verbatim() {
        let mut out = Vec::new();
        report(&Ok("  spaced reply  ".to_string()), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  spaced reply  \n");
    }

    #[test]
    fn test_report_error_is_one_line() {
        let mut out = Vec::new();
        let err = CompletionError::new(ErrorKind::RemoteServer, "bad gateway\n<html>");
        report(&Err(err), &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Error: "));
        assert_eq!(printed.lines().count(), 1);
        assert!(printed.contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_missing_key_never_reaches_network() {
        let config = ClientConfig::new("http://127.0.0.1:9/v1", "");
        let err = request_completion(config, default_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
