//! Describe an image, optionally answering a question about it

use std::sync::Arc;
use tracing::{debug, warn};

use siteqa_core::{Error, GenerationConfig, ImagePrompt, LLMProvider, Result};

use crate::ImageInput;

/// Prompt used when the user asks nothing specific
pub const DEFAULT_PROMPT: &str =
    "Identify all items in this image and provide a list of what you see.";

/// Framing turn sent ahead of every image question
pub const PREAMBLE: &str = "You are a highly skilled business analyst. \
    Based on your expertise in analyzing data, interpreting business requirements, \
    and understanding complex processes, examine the provided context. \
    Deliver a detailed analysis that outlines key insights, identifies potential risks, \
    and highlights any opportunities for improvement. \
    Provide a structured response, including specific recommendations or steps \
    for optimization where applicable. \
    Present your findings in a clear and actionable format \
    to support data-driven decision-making.";

pub struct ImageDescriber<L: LLMProvider> {
    llm: Arc<L>,
    config: GenerationConfig,
}

impl<L: LLMProvider> ImageDescriber<L> {
    pub fn new(llm: Arc<L>, config: GenerationConfig) -> Self {
        Self { llm, config }
    }

    /// The prompt actually sent for `question`
    pub fn prompt_for(question: Option<&str>) -> &str {
        match question.map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => DEFAULT_PROMPT,
        }
    }

    /// Ask the vision model about `image`.
    ///
    /// Every failure comes back as [`Error::Image`].
    pub async fn describe(&self, image: &ImageInput, question: Option<&str>) -> Result<String> {
        let prompt = ImagePrompt {
            preamble: Some(PREAMBLE.to_string()),
            text: Self::prompt_for(question).to_string(),
            image_url: image.to_data_uri(),
        };

        debug!(image = %image.name, bytes = image.bytes.len(), "describing image");

        match self.llm.generate_with_image(&prompt, &self.config).await {
            Ok(generation) => Ok(generation.text),
            Err(e) => {
                warn!(image = %image.name, error = %e, "image description failed");
                Err(match e {
                    Error::Image(_) => e,
                    other => Error::Image(other.to_string()),
                })
            }
        }
    }

    /// Read `path` and describe it
    pub async fn describe_path(
        &self,
        path: &std::path::Path,
        question: Option<&str>,
    ) -> Result<String> {
        let image = ImageInput::from_path(path).await?;
        self.describe(&image, question).await
    }
}
