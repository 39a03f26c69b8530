//! Retrieval-augmented answering engine trait

use async_trait::async_trait;

use crate::{RelatedChunk, Result, VectorRecord, VectorStore};

/// Number of records retrieved to ground an answer.
///
/// Deliberately narrower than [`RELATED_TOP_K`]: the answer is grounded in
/// the single best match while related information is drawn from a separate,
/// wider search.
pub const ANSWER_TOP_K: usize = 1;

/// Number of records retrieved for related information
pub const RELATED_TOP_K: usize = 3;

/// Words kept from a record when summarizing it
pub const SUMMARY_WORDS: usize = 40;

/// Title used for related information without a page title
pub const DEFAULT_RELATED_TITLE: &str = "Related Information";

/// Trait for RAG engines
///
/// The index is passed explicitly on every call. `None` means no web data is
/// loaded, which `answer` reports as [`crate::Error::NotLoaded`] and
/// `find_related` as an empty list.
#[async_trait]
pub trait RAGEngine: Send + Sync {
    /// Answer a question from the best-matching record
    async fn answer(&self, question: &str, index: Option<&dyn VectorStore>) -> Result<String>;

    /// Surface supporting snippets from an independent search
    async fn find_related(
        &self,
        question: &str,
        index: Option<&dyn VectorStore>,
        k: usize,
    ) -> Vec<RelatedChunk>;

    /// Build the context block from retrieved records
    fn build_context(&self, records: &[VectorRecord]) -> String;
}
