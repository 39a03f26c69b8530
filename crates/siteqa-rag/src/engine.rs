//! RAG engine implementation

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use siteqa_core::{
    ANSWER_TOP_K, Error, GenerationConfig, LLMProvider, RAGEngine, RelatedChunk, Result,
    SearchConfig, VectorRecord, VectorStore,
};

/// Answers questions from a web page index with a language model
pub struct LocalRAGEngine<L: LLMProvider> {
    llm: Arc<L>,
    config: GenerationConfig,
}

impl<L: LLMProvider> LocalRAGEngine<L> {
    /// Create a new engine using the provider's default settings
    pub fn new(llm: Arc<L>) -> Self {
        let config = GenerationConfig {
            model_id: llm.model_id().to_string(),
            ..Default::default()
        };
        Self { llm, config }
    }

    /// Create with explicit generation settings
    pub fn with_config(llm: Arc<L>, config: GenerationConfig) -> Self {
        Self { llm, config }
    }

    /// Fill the answering template.
    ///
    /// The question is spliced in verbatim, so a trailing `?` is followed by
    /// the template's own full stop.
    pub fn build_prompt(question: &str, context: &str) -> String {
        format!(
            "You are an expert website analyst. {}. Review the provided website content {} \
             and answer the user's question directly. \
             Provide clear and relevant information as requested.",
            question, context
        )
    }
}

#[async_trait]
impl<L: LLMProvider + 'static> RAGEngine for LocalRAGEngine<L> {
    async fn answer(&self, question: &str, index: Option<&dyn VectorStore>) -> Result<String> {
        let index = index.ok_or(Error::NotLoaded)?;

        let retrieved = index
            .search(question, &SearchConfig::similarity(ANSWER_TOP_K))
            .await
            .map_err(|e| Error::Answer(e.to_string()))?;

        let context = self.build_context(&retrieved.records);
        let prompt = Self::build_prompt(question, &context);

        debug!(
            retrieved = retrieved.total,
            prompt_chars = prompt.len(),
            "answering question"
        );

        let generation = self
            .llm
            .generate_with_config(&prompt, &self.config)
            .await
            .map_err(|e| Error::Answer(e.to_string()))?;

        Ok(generation.text)
    }

    async fn find_related(
        &self,
        question: &str,
        index: Option<&dyn VectorStore>,
        k: usize,
    ) -> Vec<RelatedChunk> {
        let Some(index) = index else {
            return Vec::new();
        };

        match index.search(question, &SearchConfig::similarity(k)).await {
            Ok(result) => result.records.iter().map(RelatedChunk::from_record).collect(),
            Err(e) => {
                warn!(error = %e, "related information search failed");
                Vec::new()
            }
        }
    }

    fn build_context(&self, records: &[VectorRecord]) -> String {
        records
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashEmbedder, LocalVectorStore};
    use siteqa_core::{
        ChunkingConfig, Document, DocumentMetadata, GenerationResult, ImagePrompt, RELATED_TOP_K,
    };
    use std::sync::Mutex;

    /// Echoes the prompt back so tests can see what was sent
    struct EchoLLM {
        prompts: Mutex<Vec<String>>,
    }

    impl EchoLLM {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for EchoLLM {
        async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
            self.generate_with_config(prompt, &GenerationConfig::default()).await
        }

        async fn generate_with_config(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(GenerationResult {
                text: format!("echo: {prompt}"),
                model_id: config.model_id.clone(),
                tokens_used: None,
            })
        }

        async fn generate_with_image(
            &self,
            _prompt: &ImagePrompt,
            _config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            Err(Error::Api("text only".to_string()))
        }

        fn model_id(&self) -> &str {
            "echo"
        }
    }

    struct DownLLM;

    #[async_trait]
    impl LLMProvider for DownLLM {
        async fn generate(&self, _prompt: &str) -> Result<GenerationResult> {
            Err(Error::Network("connection refused".to_string()))
        }

        async fn generate_with_config(
            &self,
            _prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            Err(Error::Network("connection refused".to_string()))
        }

        async fn generate_with_image(
            &self,
            _prompt: &ImagePrompt,
            _config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            Err(Error::Network("connection refused".to_string()))
        }

        fn model_id(&self) -> &str {
            "down"
        }
    }

    async fn index() -> LocalVectorStore {
        let docs: Vec<Document> = [
            ("pricing", "Pricing", "Our pricing plans start at ten dollars per month"),
            ("team", "Team", "The team is based in Lisbon and works remotely"),
            ("docs", "Docs", "Documentation covers installation and configuration"),
            ("blog", "Blog", "The blog has release notes and announcements"),
        ]
        .into_iter()
        .map(|(id, title, text)| {
            Document::new(
                id,
                format!("https://example.com/{id}"),
                text,
                DocumentMetadata {
                    title: Some(title.to_string()),
                    ..Default::default()
                },
            )
        })
        .collect();

        let embedder = Arc::new(HashEmbedder::default());
        LocalVectorStore::build(&docs, embedder, &ChunkingConfig::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_build_prompt() {
        let prompt = LocalRAGEngine::<EchoLLM>::build_prompt("What is this page about?", "CONTEXT");
        assert_eq!(
            prompt,
            "You are an expert website analyst. What is this page about?. \
             Review the provided website content CONTEXT \
             and answer the user's question directly. \
             Provide clear and relevant information as requested."
        );
    }

    #[tokio::test]
    async fn test_answer_without_index_is_not_loaded() {
        let llm = Arc::new(EchoLLM::new());
        let engine = LocalRAGEngine::new(llm.clone());

        for question in ["", "What is this page about?", "pricing"] {
            let err = engine.answer(question, None).await.unwrap_err();
            assert!(matches!(err, Error::NotLoaded));
        }
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_answer_is_grounded_in_single_best_record() {
        let llm = Arc::new(EchoLLM::new());
        let engine = LocalRAGEngine::new(llm.clone());
        let index = index().await;

        let answer = engine.answer("pricing plans", Some(&index)).await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Our pricing plans start at ten dollars per month"));
        assert!(!prompts[0].contains("Lisbon"));
        assert_eq!(answer, format!("echo: {}", prompts[0]));
    }

    #[tokio::test]
    async fn test_model_failure_is_answer_error() {
        let engine = LocalRAGEngine::new(Arc::new(DownLLM));
        let index = index().await;

        let err = engine.answer("pricing", Some(&index)).await.unwrap_err();
        assert!(matches!(err, Error::Answer(msg) if msg.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_find_related_without_index_is_empty() {
        let engine = LocalRAGEngine::new(Arc::new(EchoLLM::new()));
        assert!(engine.find_related("anything", None, RELATED_TOP_K).await.is_empty());
    }

    #[tokio::test]
    async fn test_find_related_is_bounded_and_stable() {
        let engine = LocalRAGEngine::new(Arc::new(EchoLLM::new()));
        let index = index().await;

        let first = engine.find_related("pricing plans", Some(&index), RELATED_TOP_K).await;
        let second = engine.find_related("pricing plans", Some(&index), RELATED_TOP_K).await;

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(first[0].title, "Pricing");
        assert_eq!(first[0].summary, "Our pricing plans start at ten dollars per month");

        assert!(engine.find_related("pricing", Some(&index), 0).await.is_empty());
    }

    #[test]
    fn test_build_context_joins_records() {
        let engine = LocalRAGEngine::new(Arc::new(EchoLLM::new()));
        let records = vec![
            VectorRecord {
                id: "1".to_string(),
                text: "first".to_string(),
                embedding: Vec::new(),
                metadata: DocumentMetadata::default(),
                score: Some(0.9),
            },
            VectorRecord {
                id: "2".to_string(),
                text: "second".to_string(),
                embedding: Vec::new(),
                metadata: DocumentMetadata::default(),
                score: Some(0.8),
            },
        ];

        assert_eq!(engine.build_context(&records), "first\n\nsecond");
        assert_eq!(engine.build_context(&[]), "");
    }
}
