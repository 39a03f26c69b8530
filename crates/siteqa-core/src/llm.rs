//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gpt-4o-mini".to_string(),
            max_tokens: None,
            temperature: Some(0.5),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// A prompt that carries one image.
///
/// `image_url` is anything the provider accepts as an image reference; the
/// vision path always passes a `data:` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePrompt {
    /// Framing sent ahead of the user turn, if any
    pub preamble: Option<String>,
    pub text: String,
    pub image_url: String,
}

/// Trait for LLM providers (e.g., OpenAI and compatible endpoints)
///
/// Implementations send exactly one request per call and never retry;
/// callers decide how a failure is surfaced.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text from a single user prompt with default configuration
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;

    /// Generate text with custom configuration
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Generate text from a prompt that includes an image
    async fn generate_with_image(
        &self,
        prompt: &ImagePrompt,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
