//! Retrieval configuration

use serde::{Deserialize, Serialize};
use siteqa_core::{ChunkingConfig, Error, Result};
use std::env;
use std::time::Duration;

use crate::embedder::DEFAULT_HASH_DIMENSION;

/// Which backend embeds page text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    OpenAI,
    Hash,
}

impl std::str::FromStr for EmbedderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "hash" => Ok(Self::Hash),
            other => Err(Error::Configuration(format!(
                "unknown embedder '{other}', expected 'openai' or 'hash'"
            ))),
        }
    }
}

/// Settings for loading pages and building the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub embedder: EmbedderKind,
    pub hash_dimension: usize,
    pub chunking: ChunkingConfig,
    pub fetch_timeout_secs: u64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::OpenAI,
            hash_dimension: DEFAULT_HASH_DIMENSION,
            chunking: ChunkingConfig::default(),
            fetch_timeout_secs: 60,
        }
    }
}

impl RagConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(kind) = env::var("SITEQA_EMBEDDER") {
            config.embedder = kind.parse()?;
        }
        if let Ok(raw) = env::var("SITEQA_CHUNK_SIZE") {
            config.chunking.chunk_size = Some(parse_number("SITEQA_CHUNK_SIZE", &raw)?);
        }
        if let Ok(raw) = env::var("SITEQA_CHUNK_OVERLAP") {
            config.chunking.chunk_overlap = parse_number("SITEQA_CHUNK_OVERLAP", &raw)?;
        }
        if let Ok(raw) = env::var("SITEQA_TIMEOUT_SECS") {
            config.fetch_timeout_secs = parse_number("SITEQA_TIMEOUT_SECS", &raw)? as u64;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.chunking.chunk_size {
            if size == 0 {
                return Err(Error::Configuration("SITEQA_CHUNK_SIZE must be positive".to_string()));
            }
            if self.chunking.chunk_overlap >= size {
                return Err(Error::Configuration(
                    "SITEQA_CHUNK_OVERLAP must be smaller than SITEQA_CHUNK_SIZE".to_string(),
                ));
            }
        }
        if self.fetch_timeout_secs == 0 {
            return Err(Error::Configuration(
                "SITEQA_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{name} has an invalid value: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_kind_parsing() {
        assert_eq!("OpenAI".parse::<EmbedderKind>().unwrap(), EmbedderKind::OpenAI);
        assert_eq!(" hash ".parse::<EmbedderKind>().unwrap(), EmbedderKind::Hash);
        assert!("faiss".parse::<EmbedderKind>().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, None);
        assert_eq!(config.fetch_timeout().as_secs(), 60);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut config = RagConfig::default();
        config.chunking = ChunkingConfig {
            chunk_size: Some(100),
            chunk_overlap: 100,
        };
        assert!(config.validate().is_err());

        config.chunking.chunk_overlap = 20;
        assert!(config.validate().is_ok());
    }
}
