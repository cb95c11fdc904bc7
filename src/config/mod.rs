//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults,
//! so the service starts locally without any setup. The only value without a
//! usable default is the OpenAI API key: the service still boots without it,
//! but every generation request will be rejected by the provider.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Environment variable names. Public so tests and scripts can refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_CHAT_MODEL: &str = "OPENAI_CHAT_MODEL";
pub const ENV_OPENAI_IMAGE_MODEL: &str = "OPENAI_IMAGE_MODEL";
pub const ENV_OPENAI_IMAGE_SIZE: &str = "OPENAI_IMAGE_SIZE";
pub const ENV_HTTP_CONNECT_TIMEOUT_SECS: &str = "HTTP_CONNECT_TIMEOUT_SECS";
pub const ENV_HTTP_REQUEST_TIMEOUT_SECS: &str = "HTTP_REQUEST_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_CHAT_MODEL: &str = "gpt-4-turbo-preview";
const DEFAULT_OPENAI_IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_OPENAI_IMAGE_SIZE: &str = "1792x1024";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
// Long-form completions routinely take more than a minute.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    openai_api_key: Option<String>,
    openai_base_url: String,
    chat_model: String,
    image_model: String,
    image_size: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    log_format: LogFormat,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = var_or(ENV_BIND_ADDR, DEFAULT_BIND_ADDR);
        let openai_api_key = env::var(ENV_OPENAI_API_KEY)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let openai_base_url = var_or(ENV_OPENAI_BASE_URL, DEFAULT_OPENAI_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&openai_base_url).map_err(|e| ConfigError::InvalidValue {
            field: ENV_OPENAI_BASE_URL,
            reason: e.to_string(),
        })?;

        let connect_timeout = Duration::from_secs(parse_secs(
            ENV_HTTP_CONNECT_TIMEOUT_SECS,
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?);
        let request_timeout = Duration::from_secs(parse_secs(
            ENV_HTTP_REQUEST_TIMEOUT_SECS,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        let log_format = match env::var(ENV_LOG_FORMAT).ok().as_deref() {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: ENV_LOG_FORMAT,
                    reason: format!("expected 'pretty' or 'json', got '{}'", other),
                });
            }
        };

        Ok(Self {
            bind_addr,
            openai_api_key,
            openai_base_url,
            chat_model: var_or(ENV_OPENAI_CHAT_MODEL, DEFAULT_OPENAI_CHAT_MODEL),
            image_model: var_or(ENV_OPENAI_IMAGE_MODEL, DEFAULT_OPENAI_IMAGE_MODEL),
            image_size: var_or(ENV_OPENAI_IMAGE_SIZE, DEFAULT_OPENAI_IMAGE_SIZE),
            connect_timeout,
            request_timeout,
            log_format,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }
    /// Base URL of the OpenAI-compatible API, without trailing slash.
    pub fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }
    pub fn image_model(&self) -> &str {
        &self.image_model
    }
    pub fn image_size(&self) -> &str {
        &self.image_size
    }
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Point the providers at another API root (mock servers in tests).
    pub fn with_openai_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.openai_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self
    }
}

impl Default for Config {
    /// Development defaults (mirrors `from_env` with no env overrides).
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            chat_model: DEFAULT_OPENAI_CHAT_MODEL.to_string(),
            image_model: DEFAULT_OPENAI_IMAGE_MODEL.to_string(),
            image_size: DEFAULT_OPENAI_IMAGE_SIZE.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_format: LogFormat::Pretty,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_secs(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: key,
            reason: format!("'{}' is not a whole number of seconds", raw),
        }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
