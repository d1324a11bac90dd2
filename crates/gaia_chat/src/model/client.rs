//! Model client for chat completions using an OpenAI-compatible API

use std::time::Instant;

use async_openai::config::{Config, OpenAIConfig};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{CompletionError, Result};
use crate::model::request::{ChatMessage, ChatRequest, ChatResponse};

/// Client for a single OpenAI-compatible inference endpoint
///
/// The base URL and bearer key are fixed at construction. Every call is a
/// single attempt with no retries.
pub struct ModelClient {
    config: ClientConfig,
    openai_config: OpenAIConfig,
    http: reqwest::Client,
}

impl ModelClient {
    /// Create a new ModelClient, rejecting an unusable configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let openai_config = OpenAIConfig::new()
            .with_api_base(config.base_url.trim().trim_end_matches('/'))
            .with_api_key(config.api_key.trim());

        let http = reqwest::Client::builder().build().map_err(|e| {
            CompletionError::Configuration(format!("failed to build HTTP client: {}", e))
        })?;

        debug!(?config, "model client configured");

        Ok(Self {
            config,
            openai_config,
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one chat-completion request and return the first choice's text
    ///
    /// The text is returned as received; an empty reply is not an error.
    pub async fn complete(&self, request: ChatRequest) -> Result<String> {
        request.validate()?;

        let start_time = Instant::now();
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "sending chat completion request"
        );
        if let Ok(body) = serde_json::to_string(&request) {
            debug!(%body, "request body");
        }

        let response = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, self.send(&request))
                .await
                .map_err(|_| {
                    CompletionError::Transport(format!(
                        "request timed out after {:.1}s",
                        limit.as_secs_f64()
                    ))
                })
                .and_then(|result| result),
            None => self.send(&request).await,
        };

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(kind = err.kind().as_str(), "chat completion failed: {}", err);
                return Err(err);
            }
        };

        let content = response.into_first_content()?;
        info!(
            elapsed_secs = start_time.elapsed().as_secs_f64(),
            chars = content.chars().count(),
            "chat completion received"
        );
        Ok(content)
    }

    /// Test connection to the model API by sending a minimal request
    pub async fn test_connection(&self, model: &str) -> Result<()> {
        let request = ChatRequest::new(model)
            .with_message(ChatMessage::user("Hi"))
            .with_temperature(0.0)
            .with_max_tokens(5);

        self.complete(request).await.map(|_| ())
    }

    /// POST the request and decode the reply, classifying on the HTTP status first
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .http
            .post(self.openai_config.url("/chat/completions"))
            .headers(self.openai_config.headers())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(CompletionError::from_status(status.as_u16(), &body));
        }

        serde_json::from_slice(&body).map_err(|e| {
            CompletionError::InvalidResponse(format!("could not decode response body: {}", e))
        })
    }
}
