//! Embedding capability

use async_trait::async_trait;

use crate::{Error, Result};

/// Trait for text embedding backends
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Api("Embedding backend returned no vector".to_string()))
    }

    /// Name of the model producing the vectors
    fn model_id(&self) -> &str;
}
