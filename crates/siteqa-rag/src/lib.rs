//! Web retrieval-augmented answering for siteqa
//!
//! This crate provides the page loader, the embedders that need no network
//! access, the in-memory vector index, the answering engine and the session
//! context that ties them together.

mod config;
mod embedder;
mod engine;
mod loader;
mod session;
mod vector_store;


pub use config::{EmbedderKind, RagConfig};
pub use embedder::{DEFAULT_HASH_DIMENSION, HashEmbedder};
pub use engine::LocalRAGEngine;
pub use loader::WebDocumentLoader;
pub use session::{LoadSummary, LoadedSite, SessionContext};
pub use vector_store::{LocalVectorStore, chunk_text};

// Re-export core types for convenience
pub use siteqa_core::{
    ChunkingConfig, Document, DocumentLoader, DocumentMetadata, Embedder, Error, RAGEngine,
    RelatedChunk, Result, SearchConfig, SearchResult, SearchType, VectorRecord, VectorStore,
    WebResponse,
};
