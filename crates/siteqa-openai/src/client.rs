//! OpenAI client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, warn};

use siteqa_core::{
    Embedder, Error, GenerationConfig, GenerationResult, ImagePrompt, LLMProvider, Result,
};

use crate::config::OpenAIConfig;

/// OpenAI chat, vision and embedding client
#[derive(Clone)]
pub struct OpenAIClient {
    config: OpenAIConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageUrl {
    pub url: String,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Deserialize)]
pub(crate) struct AssistantMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct Usage {
    pub total_tokens: u32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

/// One embedding input cut from a source text
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EmbeddingWindow {
    pub owner: usize,
    pub text: String,
    pub words: usize,
}

#[derive(Deserialize)]
pub(crate) struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
pub(crate) struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

impl ChatRequest {
    /// Request with a single user turn, as the answering chain sends it
    pub(crate) fn text(prompt: &str, config: &GenerationConfig) -> Self {
        Self {
            model: config.model_id.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Text(prompt.to_string()),
            }],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Request with an optional assistant-role preamble and a two-part user
    /// turn carrying the prompt text and the image
    pub(crate) fn with_image(prompt: &ImagePrompt, config: &GenerationConfig) -> Self {
        let mut messages = Vec::with_capacity(2);

        if let Some(preamble) = &prompt.preamble {
            messages.push(ChatMessage {
                role: "assistant",
                content: MessageContent::Text(preamble.clone()),
            });
        }

        messages.push(ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: prompt.text.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: prompt.image_url.clone(),
                    },
                },
            ]),
        });

        Self {
            model: config.model_id.clone(),
            messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl ChatResponse {
    pub(crate) fn into_result(self, model_id: &str) -> Result<GenerationResult> {
        let tokens_used = self.usage.map(|u| u.total_tokens);
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Api("No response from OpenAI".to_string()))?;

        Ok(GenerationResult {
            text,
            model_id: model_id.to_string(),
            tokens_used,
        })
    }
}

impl EmbeddingResponse {
    pub(crate) fn into_vectors(mut self, expected: usize) -> Result<Vec<Vec<f32>>> {
        self.data.sort_by_key(|entry| entry.index);
        if self.data.len() != expected {
            return Err(Error::Api(format!(
                "OpenAI returned {} embeddings for {} inputs",
                self.data.len(),
                expected
            )));
        }
        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

/// Cut every text into windows of at most `max_words` words.
///
/// Texts that already fit are passed through untouched.
pub(crate) fn split_windows(texts: &[String], max_words: usize) -> Vec<EmbeddingWindow> {
    let max_words = max_words.max(1);
    let mut windows = Vec::new();

    for (owner, text) in texts.iter().enumerate() {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= max_words {
            windows.push(EmbeddingWindow {
                owner,
                text: text.clone(),
                words: words.len(),
            });
            continue;
        }

        for chunk in words.chunks(max_words) {
            windows.push(EmbeddingWindow {
                owner,
                text: chunk.join(" "),
                words: chunk.len(),
            });
        }
    }

    windows
}

/// Fold window vectors back into one vector per text.
///
/// A text split into several windows gets the word-count weighted mean of
/// their vectors, scaled back to unit length.
pub(crate) fn combine_windows(
    windows: &[EmbeddingWindow],
    vectors: Vec<Vec<f32>>,
    texts: usize,
) -> Result<Vec<Vec<f32>>> {
    if windows.len() != vectors.len() {
        return Err(Error::Api(format!(
            "OpenAI returned {} embeddings for {} inputs",
            vectors.len(),
            windows.len()
        )));
    }

    let mut grouped: Vec<Vec<(f32, Vec<f32>)>> = vec![Vec::new(); texts];
    for (window, vector) in windows.iter().zip(vectors) {
        let group = grouped.get_mut(window.owner).ok_or_else(|| {
            Error::Api(format!("embedding window for unknown text {}", window.owner))
        })?;
        group.push((window.words.max(1) as f32, vector));
    }

    grouped
        .into_iter()
        .enumerate()
        .map(|(owner, mut parts)| {
            if parts.len() == 1 {
                return Ok(parts.remove(0).1);
            }

            let dimension = parts.first().map(|(_, v)| v.len()).unwrap_or(0);
            if dimension == 0 || parts.iter().any(|(_, v)| v.len() != dimension) {
                return Err(Error::Api(format!(
                    "inconsistent embedding dimensions for text {owner}"
                )));
            }

            let total: f32 = parts.iter().map(|(w, _)| w).sum();
            let mut mean = vec![0.0f32; dimension];
            for (weight, vector) in &parts {
                for (acc, value) in mean.iter_mut().zip(vector) {
                    *acc += value * weight / total;
                }
            }

            let norm: f32 = mean.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for value in &mut mean {
                    *value /= norm;
                }
            }
            Ok(mean)
        })
        .collect()
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Generation settings for the text answering path
    pub fn text_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.config.chat_model.clone(),
            max_tokens: None,
            temperature: Some(self.config.temperature),
            timeout: self.config.timeout(),
        }
    }

    /// Generation settings for the vision path
    pub fn vision_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.config.vision_model.clone(),
            max_tokens: Some(self.config.vision_max_tokens),
            temperature: None,
            timeout: self.config.timeout(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(self.config.api_key.trim())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, path, "OpenAI request failed");
                Error::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            warn!(status = %status, error = %error_text, path, "OpenAI API error");
            return Err(Error::Api(format!(
                "OpenAI request failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    /// Perform the actual chat completion request
    async fn perform_chat(&self, request: ChatRequest) -> Result<GenerationResult> {
        let start = Instant::now();
        let response = self.post_json("chat/completions", &request).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );

        parsed.into_result(&request.model)
    }

    /// One `/embeddings` request; `inputs` must fit the batch size
    async fn embed_batch(&self, inputs: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let expected = inputs.len();
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: inputs,
        };

        let response = self.post_json("embeddings", &request).await?;
        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        debug!(
            model = %self.config.embedding_model,
            inputs = expected,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI embeddings"
        );

        parsed.into_vectors(expected)
    }

    async fn chat_with_timeout(
        &self,
        request: ChatRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        match timeout(config.timeout, self.perform_chat(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Network("Request timed out".to_string())),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = self.text_config();
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.chat_with_timeout(ChatRequest::text(prompt, config), config)
            .await
    }

    async fn generate_with_image(
        &self,
        prompt: &ImagePrompt,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.chat_with_timeout(ChatRequest::with_image(prompt, config), config)
            .await
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl Embedder for OpenAIClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let windows = split_windows(texts, self.config.embedding_window_words);
        if windows.len() > texts.len() {
            debug!(texts = texts.len(), windows = windows.len(), "split long embedding inputs");
        }

        let mut vectors = Vec::with_capacity(windows.len());
        for batch in windows.chunks(self.config.embedding_batch_size.max(1)) {
            let inputs = batch.iter().map(|w| w.text.as_str()).collect();
            vectors.extend(self.embed_batch(inputs).await?);
        }

        combine_windows(&windows, vectors, texts.len())
    }

    fn model_id(&self) -> &str {
        &self.config.embedding_model
    }
}
