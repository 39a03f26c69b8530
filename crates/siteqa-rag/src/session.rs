//! Session context holding the active web index

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use siteqa_core::{
    ChunkingConfig, DocumentLoader, Embedder, Error, RAGEngine, RELATED_TOP_K, RelatedChunk,
    Result, VectorStore, WebResponse,
};

use crate::LocalVectorStore;

/// An index together with where and when it was built
pub struct LoadedSite {
    pub url: String,
    pub index: LocalVectorStore,
    pub document_count: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Outcome of a successful load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub url: String,
    pub documents: usize,
    pub records: usize,
}

/// State for one interactive run.
///
/// The active site sits behind an `RwLock` and is only ever replaced
/// wholesale: a load builds the new index completely before taking the
/// write lock, and readers work on an `Arc` snapshot, so no caller can see
/// a half-built index.
pub struct SessionContext {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    engine: Arc<dyn RAGEngine>,
    chunking: ChunkingConfig,
    site: RwLock<Option<Arc<LoadedSite>>>,
}

impl SessionContext {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        engine: Arc<dyn RAGEngine>,
    ) -> Self {
        Self {
            loader,
            embedder,
            engine,
            chunking: ChunkingConfig::default(),
            site: RwLock::new(None),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Load `url` and make its index the active one.
    ///
    /// On failure the previously loaded site, if any, stays active.
    pub async fn load_url(&self, url: &str) -> Result<LoadSummary> {
        let documents = self.loader.load(url).await.map_err(|e| match e {
            Error::Load(_) => e,
            other => Error::Load(other.to_string()),
        })?;

        if documents.is_empty() {
            return Err(Error::Load(
                "No documents found from the URL. Please try a different URL.".to_string(),
            ));
        }

        let index = LocalVectorStore::build(&documents, self.embedder.clone(), &self.chunking)
            .await
            .map_err(|e| match e {
                Error::Index(_) => e,
                other => Error::Index(other.to_string()),
            })?;

        let summary = LoadSummary {
            url: url.trim().to_string(),
            documents: documents.len(),
            records: index.count(),
        };

        let site = Arc::new(LoadedSite {
            url: summary.url.clone(),
            index,
            document_count: summary.documents,
            loaded_at: Utc::now(),
        });

        *self.site.write().await = Some(site);
        info!(url = %summary.url, records = summary.records, "web data loaded");

        Ok(summary)
    }

    /// Discard the active index
    pub async fn reset(&self) {
        if self.site.write().await.take().is_some() {
            info!("session reset");
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.site.read().await.is_some()
    }

    /// Snapshot of the active site
    pub async fn current(&self) -> Option<Arc<LoadedSite>> {
        self.site.read().await.clone()
    }

    pub async fn source_url(&self) -> Option<String> {
        self.current().await.map(|site| site.url.clone())
    }

    /// Answer a question from the active index
    pub async fn answer(&self, question: &str) -> Result<String> {
        let site = self.current().await;
        let index = site.as_ref().map(|s| &s.index as &dyn VectorStore);
        self.engine.answer(question, index).await
    }

    /// Related information for a question; empty when nothing is loaded
    pub async fn find_related(&self, question: &str) -> Vec<RelatedChunk> {
        let site = self.current().await;
        let index = site.as_ref().map(|s| &s.index as &dyn VectorStore);
        self.engine.find_related(question, index, RELATED_TOP_K).await
    }

    /// Answer a question and gather related information.
    ///
    /// Both steps run against the same snapshot, but each does its own
    /// retrieval. With nothing loaded this is [`Error::NotLoaded`] whatever
    /// the question; an empty question against a loaded site is
    /// [`Error::InvalidInput`].
    pub async fn ask(&self, question: &str) -> Result<WebResponse> {
        let site = self.current().await.ok_or(Error::NotLoaded)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("Question is empty".to_string()));
        }

        let index = Some(&site.index as &dyn VectorStore);

        let answer = self.engine.answer(question, index).await?;
        let related = self.engine.find_related(question, index, RELATED_TOP_K).await;

        if answer.trim().is_empty() {
            warn!("model returned an empty answer");
        }

        Ok(WebResponse { answer, related })
    }
}
