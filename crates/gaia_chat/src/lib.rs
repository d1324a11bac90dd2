//! gaia_chat: one-shot chat completions against an OpenAI-compatible endpoint
//!
//! This library provides:
//! - Endpoint and credential configuration, readable from the environment
//! - Request/response wire types for the chat completions API
//! - A model client that makes exactly one attempt per request
//! - A structured error taxonomy, flattened to text only when reported
//!
//! # Example
//!
//! ```no_run
//! use gaia_chat::{report, request_completion, ChatMessage, ChatRequest, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::from_env();
//!     let request = ChatRequest::new("Meta-Llama-3-8B-Instruct-Q5_K_M")
//!         .with_message(ChatMessage::system("You are a strategic reasoner."))
//!         .with_message(ChatMessage::user("What is the purpose of life?"));
//!
//!     let result = request_completion(config, request).await;
//!     report(&result, &mut std::io::stdout()).ok();
//! }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod requester;

pub use config::{ClientConfig, DEFAULT_BASE_URL, ENV_API_KEY, ENV_BASE_URL, ENV_TIMEOUT_SECS};
pub use error::{classify_api_error, classify_status, CompletionError, ErrorKind, Result};
pub use model::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChoiceMessage, ModelClient, Role,
};
pub use requester::{
    default_request, report, request_completion, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT,
};
