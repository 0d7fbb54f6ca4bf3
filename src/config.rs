//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DIFFICULTY_MODEL_PATH, DEFAULT_EMBEDDING_BASE_URL,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_EXECUTION_TIMEOUT_SECS, DEFAULT_HINT_TIMING_MODEL_PATH,
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_OUTPUT_LIMIT_BYTES,
    DEFAULT_PYTHON_BIN, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Global application configuration (lazily initialized)
///
/// Only the binaries read this; library code takes its configuration as arguments.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub judge: JudgeConfig,
    pub models: ModelConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Grading configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Interpreter binary
    pub python_bin: String,
    /// Wall-clock limit per test case
    pub timeout_secs: u64,
    /// Cap on each captured output stream
    pub output_limit_bytes: u64,
}

/// Classifier artifact locations
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub difficulty_model_path: PathBuf,
    pub hint_timing_model_path: PathBuf,
}

/// Text generation service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; calls fall back to local text when empty
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Embedding provider configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

/// Which embedder implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    Remote,
    Local,
}

impl FromStr for EmbeddingProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            _ => Err(ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string())),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
            models: ModelConfig::from_env()?,
            llm: LlmConfig::from_env()?,
            embedding: EmbeddingConfig::from_env()?,
        })
    }
}

/// Read an optional variable, parsing it when present
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        })
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = parse_var("EXECUTION_TIMEOUT_SECS", DEFAULT_EXECUTION_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("EXECUTION_TIMEOUT_SECS".to_string()));
        }

        Ok(Self {
            python_bin: env::var("PYTHON_BIN").unwrap_or_else(|_| DEFAULT_PYTHON_BIN.to_string()),
            timeout_secs,
            output_limit_bytes: parse_var("OUTPUT_LIMIT_BYTES", DEFAULT_OUTPUT_LIMIT_BYTES)?,
        })
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            python_bin: DEFAULT_PYTHON_BIN.to_string(),
            timeout_secs: DEFAULT_EXECUTION_TIMEOUT_SECS,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

impl ModelConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            difficulty_model_path: PathBuf::from(
                env::var("DIFFICULTY_MODEL_PATH")
                    .unwrap_or_else(|_| DEFAULT_DIFFICULTY_MODEL_PATH.to_string()),
            ),
            hint_timing_model_path: PathBuf::from(
                env::var("HINT_TIMING_MODEL_PATH")
                    .unwrap_or_else(|_| DEFAULT_HINT_TIMING_MODEL_PATH.to_string()),
            ),
        })
    }
}

impl LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            base_url: env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            timeout_secs: parse_var("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
        })
    }
}

impl EmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            provider: parse_var("EMBEDDING_PROVIDER", EmbeddingProvider::Remote)?,
            model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            api_key: env::var("EMBEDDING_API_KEY").unwrap_or_default(),
            base_url: env::var("EMBEDDING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_BASE_URL.to_string()),
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
