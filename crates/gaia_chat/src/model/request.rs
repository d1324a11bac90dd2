//! Wire types for the chat completions endpoint

use serde::{Deserialize, Serialize};

use crate::error::{CompletionError, Result};

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of a chat-completion request
///
/// Serializes to `{"model", "messages", "temperature", "max_tokens"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            model: "Meta-Llama-3-8B-Instruct-Q5_K_M".to_string(),
            messages: Vec::new(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

impl ChatRequest {
    /// Create an empty request for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Append a message
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Check the parts of the request that can be verified locally.
    ///
    /// Temperature is left to the service, whose accepted range varies.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(CompletionError::RequestValidation(
                "model name is empty".to_string(),
            ));
        }
        if self.messages.is_empty() {
            return Err(CompletionError::RequestValidation(
                "at least one message is required".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(CompletionError::RequestValidation(
                "max_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// The parts of a chat-completion response this crate reads.
///
/// Everything besides `choices[].message.content` is ignored, and a missing
/// or null content decodes as empty text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice
    pub fn into_first_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| {
                CompletionError::InvalidResponse("response contained no choices".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn sample_request() -> ChatRequest {
        ChatRequest::new("test-model")
            .with_message(ChatMessage::system("You are a strategic reasoner."))
            .with_message(ChatMessage::user("What is the purpose of life?"))
            .with_temperature(0.7)
            .with_max_tokens(500)
    }

    #[test]
    fn test_request_wire_shape() {
        let value = serde_json::to_value(sample_request()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(value["model"], "test-model");
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(
            value["messages"][1]["content"],
            "What is the purpose of life?"
        );
        let temperature = value["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_request_defaults() {
        let request = ChatRequest::default();
        assert_eq!(request.model, "Meta-Llama-3-8B-Instruct-Q5_K_M");
        assert_eq!(request.max_tokens, 500);
        assert!(request.messages.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_messages() {
        let err = ChatRequest::new("m").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestValidation);
    }

    #[test]
    fn test_validate_rejects_zero_tokens_and_blank_model() {
        let zero = sample_request().with_max_tokens(0);
        assert_eq!(
            zero.validate().unwrap_err().kind(),
            ErrorKind::RequestValidation
        );

        let blank = ChatRequest::new("  ").with_message(ChatMessage::user("hi"));
        assert_eq!(
            blank.validate().unwrap_err().kind(),
            ErrorKind::RequestValidation
        );
    }

    #[test]
    fn test_validate_leaves_temperature_to_service() {
        assert!(sample_request().with_temperature(5.0).validate().is_ok());
    }

    #[test]
    fn test_response_reads_first_choice_only() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "42"}},
                {"index": 1, "message": {"role": "assistant", "content": "43"}}
            ],
            "usage": {"total_tokens": 3}
        }))
        .unwrap();
        assert_eq!(response.into_first_content().unwrap(), "42");
    }

    #[test]
    fn test_response_null_content_is_empty() {
        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(response.into_first_content().unwrap(), "");
    }

    #[test]
    fn test_response_without_choices_is_invalid() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(
            response.into_first_content().unwrap_err().kind(),
            ErrorKind::InvalidResponse
        );
    }
}
