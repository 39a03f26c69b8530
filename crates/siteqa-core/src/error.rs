//! Error types for siteqa

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by the answering pipeline and its collaborators.
///
/// The first five variants are the user-facing outcomes of the pipeline
/// stages; the rest describe failures of the plumbing underneath them and
/// are normally wrapped into one of the stage variants before reaching a
/// caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load documents from URL: {0}")]
    Load(String),

    #[error("Failed to create vector store from web data: {0}")]
    Index(String),

    #[error("Vector store is not initialized. Please load web data first.")]
    NotLoaded,

    #[error("Failed to generate response: {0}")]
    Answer(String),

    #[error("Error generating image description: {0}")]
    Image(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
