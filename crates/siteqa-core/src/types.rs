//! Common types used across siteqa

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_RELATED_TITLE, SUMMARY_WORDS, VectorRecord};

/// A supporting snippet shown next to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedChunk {
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
}

impl RelatedChunk {
    /// Summarize a retrieved record
    pub fn from_record(record: &VectorRecord) -> Self {
        let title = record
            .metadata
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_RELATED_TITLE)
            .to_string();

        Self {
            title,
            summary: summarize(&record.text, SUMMARY_WORDS),
            image_url: record.metadata.image_url.clone(),
        }
    }
}

/// First `max_words` whitespace-delimited words of `text`, space-joined
pub fn summarize(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Answer plus related information for one question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebResponse {
    pub answer: String,
    pub related: Vec<RelatedChunk>,
}
