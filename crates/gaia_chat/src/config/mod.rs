//! Configuration module for gaia_chat
//!
//! This module contains:
//! - `client`: endpoint, credential and timeout settings

mod client;

pub use client::{ClientConfig, DEFAULT_BASE_URL, ENV_API_KEY, ENV_BASE_URL, ENV_TIMEOUT_SECS};
