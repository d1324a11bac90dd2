//! Gaia chat CLI - send one chat-completion request and print the reply
//!
//! Usage:
//!     gaia-chat [OPTIONS] [PROMPT]
//!
//! Environment Variables:
//!     GAIA_BASE_URL: Model API base URL (default: https://qwen7b.gaia.domains/v1)
//!     GAIA_API_KEY: API key for model authentication (required)
//!     GAIA_MODEL: Model name (default: Meta-Llama-3-8B-Instruct-Q5_K_M)
//!     GAIA_SYSTEM_PROMPT: System message (default: You are a strategic reasoner.)
//!     GAIA_PROMPT: User message (default: What is the purpose of life?)
//!     GAIA_TIMEOUT_SECS: Request timeout in seconds (default: none)
//!     RUST_LOG: Log filter for diagnostics on stderr (default: warn)

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gaia_chat::{
    report, request_completion, ChatMessage, ChatRequest, ClientConfig, CompletionError,
    ModelClient, DEFAULT_BASE_URL, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Gaia chat - one-shot chat completion against an OpenAI-compatible endpoint
#[derive(Parser, Debug)]
#[command(name = "gaia-chat")]
#[command(about = "Send one chat-completion request and print the reply")]
#[command(after_help = r#"Examples:
    # Ask the default question
    GAIA_API_KEY=gaia-xxxxx gaia-chat

    # Ask something else
    gaia-chat --api-key gaia-xxxxx "Summarise the rules of chess"

    # Use a different node and model
    gaia-chat --base-url https://llama8b.gaia.domains/v1 --model llama

    # Check that the endpoint accepts the key, then exit
    gaia-chat --check
"#)]
struct Cli {
    // Endpoint options
    /// Model API base URL
    #[arg(long, env = "GAIA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// API key for model authentication
    #[arg(long, env = "GAIA_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,

    /// Request timeout in seconds (waits for the transport if unset)
    #[arg(long, env = "GAIA_TIMEOUT_SECS", allow_negative_numbers = true)]
    timeout_secs: Option<f64>,

    // Request options
    /// Model name
    #[arg(long, env = "GAIA_MODEL", default_value = "Meta-Llama-3-8B-Instruct-Q5_K_M")]
    model: String,

    /// System message
    #[arg(long, env = "GAIA_SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    system: String,

    /// Sampling temperature (range checked by the service)
    #[arg(long, default_value = "0.7", allow_negative_numbers = true)]
    temperature: f32,

    /// Maximum tokens to generate
    #[arg(long, default_value = "500")]
    max_tokens: u32,

    // Other options
    /// Send a minimal request to verify the endpoint and key, then exit
    #[arg(long)]
    check: bool,

    /// Exit with status 1 when the request fails
    #[arg(long)]
    strict: bool,

    /// Log request details to stderr
    #[arg(short = 'v', long)]
    verbose: bool,

    /// User message
    #[arg(env = "GAIA_PROMPT", default_value = DEFAULT_USER_PROMPT)]
    prompt: String,
}

impl Cli {
    fn client_config(&self) -> gaia_chat::Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.base_url, &self.api_key);
        if let Some(secs) = self.timeout_secs {
            let timeout = Duration::try_from_secs_f64(secs)
                .ok()
                .filter(|t| !t.is_zero())
                .ok_or_else(|| {
                    CompletionError::Configuration(format!(
                        "timeout must be a positive number of seconds, got {}",
                        secs
                    ))
                })?;
            config = config.with_timeout(timeout);
        }
        Ok(config)
    }

    fn chat_request(&self) -> ChatRequest {
        let mut request = ChatRequest::new(&self.model)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        if !self.system.is_empty() {
            request = request.with_message(ChatMessage::system(&self.system));
        }
        request.with_message(ChatMessage::user(&self.prompt))
    }
}

/// Install the stderr log subscriber; stdout carries only the result line
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Build the client and send the request; every failure stays a `CompletionError`
async fn run_request(args: &Cli) -> gaia_chat::Result<String> {
    let config = args.client_config()?;
    debug!(?config, "configuration loaded");
    request_completion(config, args.chat_request()).await
}

/// Check if the model API is accessible
async fn check_model_api(args: &Cli) -> bool {
    println!("\u{1F50D} Checking model API...");
    println!("{}", "-".repeat(50));

    print!("1. Checking API connectivity ({})... ", args.base_url);
    io::stdout().flush().ok();

    let result = match args.client_config().and_then(ModelClient::new) {
        Ok(client) => client.test_connection(&args.model).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            println!("\u{2705} OK");
            println!("{}", "-".repeat(50));
            println!("\u{2705} Model API checks passed!\n");
            true
        }
        Err(e) => {
            println!("\u{274C} FAILED");
            println!("   Error: {}", e);
            println!("   Kind: {}", e.kind().as_str());
            println!("{}", "-".repeat(50));
            println!("\u{274C} Model API check failed. Please fix the issues above.");
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    // Handle --check
    if args.check {
        if !check_model_api(&args).await {
            std::process::exit(1);
        }
        return Ok(());
    }

    let result = run_request(&args).await;
    if let Err(e) = &result {
        info!(kind = e.kind().as_str(), "request failed");
    }

    let mut stdout = io::stdout().lock();
    report(&result, &mut stdout).context("failed to write result")?;

    if args.strict && result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
