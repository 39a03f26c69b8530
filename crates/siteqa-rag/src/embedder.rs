//! Offline feature-hashing embedder

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use siteqa_core::{Embedder, Result};

pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Deterministic embedder built from hashed unigrams and bigrams.
///
/// Needs no network access; vectors are L2-normalized so cosine similarity
/// reduces to a dot product.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn bucket(&self, token: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish()
    }

    /// Embed one text
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let mut embedding = vec![0.0f32; self.dimension];

        for word in &words {
            let hash = self.bucket(word);
            embedding[(hash as usize) % self.dimension] += 1.0;

            if word.len() > 3 {
                let secondary = ((hash >> 16) as usize) % self.dimension;
                embedding[secondary] += 0.5;
            }
        }

        for window in words.windows(2) {
            let hash = self.bucket(&format!("{} {}", window[0], window[1]));
            embedding[(hash as usize) % self.dimension] += 0.3;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        embedding
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_id(&self) -> &str {
        "feature-hash"
    }
}
