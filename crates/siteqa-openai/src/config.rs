//! OpenAI configuration

use serde::{Deserialize, Serialize};
use siteqa_core::{Error, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
/// Words per embedding input; well under the 8191-token context of the
/// default embedding model
pub const DEFAULT_EMBEDDING_WINDOW_WORDS: usize = 3000;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;

/// Configuration for the OpenAI client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub vision_max_tokens: u32,
    pub timeout_secs: u64,
    pub embedding_window_words: usize,
    pub embedding_batch_size: usize,
}

impl OpenAIConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_key(None)
    }

    /// Like [`from_env`](Self::from_env), but an explicit key wins over the
    /// environment
    pub fn from_env_with_key(api_key: Option<String>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => key,
            None => env::var("OPENAI_API_KEY")
                .or_else(|_| env::var("API_KEY"))
                .map_err(|_| {
                    Error::Configuration(
                        "OPENAI_API_KEY or API_KEY environment variable not found".to_string(),
                    )
                })?,
        };

        let mut config = Self::new(api_key);

        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("SITEQA_CHAT_MODEL") {
            config.chat_model = model;
        }
        if let Ok(model) = env::var("SITEQA_VISION_MODEL") {
            config.vision_model = model;
        }
        if let Ok(model) = env::var("SITEQA_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(temperature) = parse_env::<f32>("SITEQA_TEMPERATURE")? {
            config.temperature = temperature;
        }
        if let Some(timeout) = parse_env::<u64>("SITEQA_TIMEOUT_SECS")? {
            config.timeout_secs = timeout;
        }
        if let Some(words) = parse_env::<usize>("SITEQA_EMBEDDING_WINDOW_WORDS")? {
            config.embedding_window_words = words;
        }
        if let Some(size) = parse_env::<usize>("SITEQA_EMBEDDING_BATCH_SIZE")? {
            config.embedding_batch_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            vision_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: 0.5,
            vision_max_tokens: 1024,
            timeout_secs: 60,
            embedding_window_words: DEFAULT_EMBEDDING_WINDOW_WORDS,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration("API key is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Configuration(
                "SITEQA_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.embedding_window_words == 0 || self.embedding_batch_size == 0 {
            return Err(Error::Configuration(
                "embedding window and batch size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Configuration(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}
