//! Configuration management for the spatial agent.
//!
//! Configuration can be set via environment variables (a `.env` file in the
//! working directory is loaded first):
//! - `LLM_API_KEY` - Required. API key for the chat-completion endpoint. `GROQ_API_KEY` is accepted as a fallback.
//! - `LLM_BASE_URL` - Optional. OpenAI-compatible base URL. Defaults to `https://api.groq.com/openai/v1`.
//! - `DEFAULT_MODEL` - Optional. The model identifier. Defaults to `llama-3.3-70b-versatile`.
//! - `LLM_TEMPERATURE` - Optional. Decoding temperature. Defaults to `0`.
//! - `LLM_TIMEOUT_SECS` - Optional. Request timeout for model calls. Defaults to `120`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `15`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8501`.
//! - `MAX_UPLOAD_BYTES` - Optional. Request body limit for layer uploads. Defaults to 50 MiB.

use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Remote chat-completion endpoint settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token for the endpoint
    pub api_key: String,

    /// OpenAI-compatible base URL (without the `/chat/completions` suffix)
    pub base_url: String,

    /// Decoding temperature; zero requests deterministic output
    pub temperature: f32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model endpoint configuration
    pub llm: LlmConfig,

    /// Default model identifier
    pub default_model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Body size limit for multipart uploads
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if neither `LLM_API_KEY` nor
    /// `GROQ_API_KEY` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .map_err(|_| ConfigError::MissingEnvVar("LLM_API_KEY".to_string()))?;

        let base_url = std::env::var("LLM_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        Ok(Self {
            llm: LlmConfig {
                api_key,
                base_url,
                temperature: env_or("LLM_TEMPERATURE", 0.0)?,
                timeout_secs: env_or("LLM_TIMEOUT_SECS", 120)?,
            },
            default_model,
            host,
            port: env_or("PORT", 8501)?,
            max_iterations: env_or("MAX_ITERATIONS", 15)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, default_model: String) -> Self {
        Self {
            llm: LlmConfig {
                api_key,
                base_url: DEFAULT_BASE_URL.to_string(),
                temperature: 0.0,
                timeout_secs: 120,
            },
            default_model,
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_iterations: 15,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))
}
