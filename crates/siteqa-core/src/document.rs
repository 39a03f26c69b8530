//! Loaded documents and the loader trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Metadata captured alongside a loaded page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub image_url: Option<String>,
}

/// A normalized document produced by a [`DocumentLoader`].
///
/// Text is whitespace-normalized on construction and never changes after
/// that; loaders must not emit a document whose text is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source_url: String,
    pub text_content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Build a document, collapsing every run of whitespace in `raw_text`
    /// to a single space.
    pub fn new(
        id: impl Into<String>,
        source_url: impl Into<String>,
        raw_text: &str,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            text_content: normalize_whitespace(raw_text),
            metadata,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text_content.is_empty()
    }
}

/// Collapse all runs of whitespace to one space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Configuration for splitting documents before embedding.
///
/// `chunk_size` is measured in words. `None` keeps one record per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: None,
            chunk_overlap: 0,
        }
    }
}

/// Trait for document loaders
///
/// A loader turns one URL into one or more normalized documents. It fails
/// with [`crate::Error::Load`] when the fetch fails or yields no text.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Fetch and normalize the documents behind `url`
    async fn load(&self, url: &str) -> Result<Vec<Document>>;
}
