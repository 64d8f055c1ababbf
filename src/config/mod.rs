use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8001").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// API key for the Groq chat-completions endpoint
    pub groq_api_key: String,

    /// Model served by Groq
    #[serde(default = "default_groq_model")]
    pub groq_model: String,

    /// OpenAI-compatible base URL (no trailing slash)
    #[serde(default = "default_groq_base_url")]
    pub groq_base_url: String,

    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,

    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,

    /// Upstream calls admitted per window
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: usize,

    /// Sliding window length in milliseconds
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,

    /// Total attempts per job, including the first one
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Base backoff delay in seconds, doubled for every further retry
    #[serde(default = "default_retry_base_delay_secs")]
    pub retry_base_delay_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8001".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_max_tokens() -> u32 {
    2048
}

// 1200 requests per minute = 20 per second
fn default_rate_limit_requests() -> usize {
    20
}

fn default_rate_limit_window_ms() -> u64 {
    1000
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_secs() -> u64 {
    60
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limiter settings that would never admit a call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_requests == 0 {
            return Err(ConfigError::Zero("RATE_LIMIT_REQUESTS"));
        }
        if self.rate_limit_window_ms == 0 {
            return Err(ConfigError::Zero("RATE_LIMIT_WINDOW_MS"));
        }
        Ok(())
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_secs(self.retry_base_delay_secs)
    }
}
