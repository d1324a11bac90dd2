//! Model client module for chat completions
//!
//! This module provides:
//! - `client`: OpenAI-compatible model client
//! - `request`: request and response wire types

mod client;
mod request;

pub use client::ModelClient;
pub use request::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChoiceMessage, Role};
