//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DocumentMetadata, Result};

/// A record stored in the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub text: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
    pub metadata: DocumentMetadata,
    pub score: Option<f32>,
}

/// Search result from vector store, best match first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub records: Vec<VectorRecord>,
    pub total: usize,
}

/// How candidates are ranked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Cosine similarity between query and record embeddings
    #[default]
    Similarity,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub search_type: SearchType,
}

impl SearchConfig {
    pub fn similarity(top_k: usize) -> Self {
        Self {
            top_k,
            search_type: SearchType::Similarity,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::similarity(4)
    }
}

/// Trait for queryable vector indexes
///
/// An index is built once and then only read; replacing the contents means
/// building a new index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Search for records similar to a query text
    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchResult>;

    /// Search using a precomputed query embedding
    fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> SearchResult;

    /// Get the total number of records
    fn count(&self) -> usize;
}
