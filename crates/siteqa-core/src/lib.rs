//! Core traits and types for siteqa
//!
//! This crate defines the seams shared by the rest of the workspace: document
//! loading, embedding, similarity search, language-model generation and the
//! retrieval-augmented answering engine. Concrete implementations live in
//! `siteqa-rag`, `siteqa-openai` and `siteqa-vision`.

pub mod document;
pub mod embedder;
pub mod error;
pub mod llm;
pub mod rag;
pub mod types;
pub mod vector_store;


pub use document::{ChunkingConfig, Document, DocumentLoader, DocumentMetadata};
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, ImagePrompt, LLMProvider};
pub use rag::{
    ANSWER_TOP_K, DEFAULT_RELATED_TITLE, RAGEngine, RELATED_TOP_K, SUMMARY_WORDS,
};
pub use types::{RelatedChunk, WebResponse};
pub use vector_store::{SearchConfig, SearchResult, SearchType, VectorRecord, VectorStore};
