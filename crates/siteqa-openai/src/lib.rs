//! OpenAI integration for siteqa
//!
//! This crate provides the OpenAI implementation of the `LLMProvider` and
//! `Embedder` traits. Any endpoint speaking the OpenAI chat completions and
//! embeddings protocol can be targeted through `OPENAI_BASE_URL`.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::OpenAIClient;
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_EMBEDDING_WINDOW_WORDS, OpenAIConfig,
};

// Re-export core types for convenience
pub use siteqa_core::{
    Embedder, Error, GenerationConfig, GenerationResult, ImagePrompt, LLMProvider, Result,
};
