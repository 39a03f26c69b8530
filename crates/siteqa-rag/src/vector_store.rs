//! In-memory vector index

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::info;

use siteqa_core::{
    ChunkingConfig, Document, Embedder, Error, Result, SearchConfig, SearchResult, SearchType,
    VectorRecord, VectorStore,
};

/// Immutable similarity index over embedded records.
///
/// Built in one step from a list of documents; a new page means a new
/// index, never an update of this one.
pub struct LocalVectorStore {
    records: Vec<VectorRecord>,
    embedder: Arc<dyn Embedder>,
}

impl LocalVectorStore {
    /// Embed `documents` and build an index over them.
    ///
    /// Fails with [`Error::Index`] when there is nothing to index or the
    /// embedding call fails.
    pub async fn build(
        documents: &[Document],
        embedder: Arc<dyn Embedder>,
        chunking: &ChunkingConfig,
    ) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::Index("no documents to index".to_string()));
        }

        let mut records = Vec::new();
        for document in documents {
            let chunks = chunk_text(&document.text_content, chunking);
            for (i, chunk) in chunks.into_iter().enumerate() {
                records.push(VectorRecord {
                    id: format!("{}-{}", document.id, i),
                    text: chunk,
                    embedding: Vec::new(),
                    metadata: document.metadata.clone(),
                    score: None,
                });
            }
        }

        if records.is_empty() {
            return Err(Error::Index("documents contain no text".to_string()));
        }

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let embeddings = embedder
            .embed(&texts)
            .await
            .map_err(|e| Error::Index(e.to_string()))?;

        if embeddings.len() != records.len() {
            return Err(Error::Index(format!(
                "embedder returned {} vectors for {} records",
                embeddings.len(),
                records.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 || embeddings.iter().any(|e| e.len() != dimension) {
            return Err(Error::Index("embeddings have inconsistent dimensions".to_string()));
        }

        for (record, embedding) in records.iter_mut().zip(embeddings) {
            record.embedding = embedding;
        }

        info!(
            records = records.len(),
            dimension,
            model = embedder.model_id(),
            "vector index built"
        );

        Ok(Self { records, embedder })
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    /// Simple cosine similarity calculation
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchResult> {
        if config.top_k == 0 {
            return Ok(SearchResult {
                records: Vec::new(),
                total: 0,
            });
        }

        let vector = self.embedder.embed_query(query).await?;
        Ok(self.search_by_vector(&vector, config))
    }

    fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> SearchResult {
        let mut results: Vec<VectorRecord> = match config.search_type {
            SearchType::Similarity => self
                .records
                .iter()
                .map(|record| {
                    let mut scored = record.clone();
                    scored.score = Some(Self::cosine_similarity(vector, &record.embedding));
                    scored
                })
                .collect(),
        };

        // stable sort keeps insertion order for equal scores
        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(config.top_k);

        let total = results.len();
        SearchResult {
            records: results,
            total,
        }
    }

    fn count(&self) -> usize {
        self.records.len()
    }
}

/// Split text into word windows, or keep it whole when chunking is off
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let size = match config.chunk_size {
        Some(size) if size > 0 => size,
        _ => return vec![text.to_string()],
    };

    let words: Vec<&str> = text.split_whitespace().collect();
    let step = size.saturating_sub(config.chunk_overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + size).min(words.len());
        chunks.push(words[start..end].join(" "));

        if end >= words.len() {
            break;
        }

        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashEmbedder;
    use siteqa_core::DocumentMetadata;

    fn doc(id: &str, text: &str) -> Document {
        Document::new(id, format!("https://example.com/{id}"), text, DocumentMetadata::default())
    }

    fn hash_embedder() -> Arc<dyn Embedder> {
        Arc::new(HashEmbedder::default())
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Api("rate limited".to_string()))
        }

        fn model_id(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_build_one_record_per_document() {
        let docs = vec![doc("a", "apples and pears"), doc("b", "trains and buses")];
        let store = LocalVectorStore::build(&docs, hash_embedder(), &ChunkingConfig::default())
            .await
            .unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(store.records()[0].id, "a-0");
        assert_eq!(store.records()[0].text, "apples and pears");
    }

    #[tokio::test]
    async fn test_build_empty_is_index_error() {
        let err = LocalVectorStore::build(&[], hash_embedder(), &ChunkingConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Index(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_index_error() {
        let docs = [doc("a", "text")];
        let failing: Arc<dyn Embedder> = Arc::new(FailingEmbedder);
        let err = LocalVectorStore::build(&docs, failing, &ChunkingConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Index(msg) if msg.contains("rate limited")));
    }

    #[tokio::test]
    async fn test_search_ranks_best_match_first() {
        let docs = vec![
            doc("weather", "The weather in Lisbon is mild in winter"),
            doc("pricing", "Our pricing plans start at ten dollars per month"),
        ];
        let store = LocalVectorStore::build(&docs, hash_embedder(), &ChunkingConfig::default())
            .await
            .unwrap();

        let result = store.search("pricing plans", &SearchConfig::similarity(2)).await.unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.records[0].id, "pricing-0");
        assert!(result.records[0].score >= result.records[1].score);

        let top = store.search("pricing plans", &SearchConfig::similarity(1)).await.unwrap();
        assert_eq!(top.records.len(), 1);

        let none = store.search("pricing plans", &SearchConfig::similarity(0)).await.unwrap();
        assert!(none.records.is_empty());
    }

    #[test]
    fn test_cosine_similarity() {
        assert_eq!(LocalVectorStore::cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(LocalVectorStore::cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(LocalVectorStore::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(LocalVectorStore::cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_chunk_text() {
        let text = "one two three four five six seven";

        assert_eq!(chunk_text(text, &ChunkingConfig::default()), vec![text.to_string()]);
        assert!(chunk_text("  ", &ChunkingConfig::default()).is_empty());

        let config = ChunkingConfig {
            chunk_size: Some(3),
            chunk_overlap: 1,
        };
        assert_eq!(
            chunk_text(text, &config),
            vec!["one two three", "three four five", "five six seven"]
        );
    }

    #[test]
    fn test_chunk_overlap_never_stalls() {
        let config = ChunkingConfig {
            chunk_size: Some(2),
            chunk_overlap: 5,
        };
        assert_eq!(chunk_text("a b c", &config), vec!["a b", "b c"]);
    }
}
