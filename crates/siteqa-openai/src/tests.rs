//! Snapshot tests for the OpenAI client

#[cfg(test)]
mod snapshot_tests {
    use crate::{OpenAIClient, OpenAIConfig};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_config_snapshot() {
        let config = OpenAIConfig::new("sk-test-redacted");

        assert_yaml_snapshot!(config, @r###"
        ---
        base_url: "https://api.openai.com/v1"
        chat_model: gpt-4o-mini
        vision_model: gpt-4o-mini
        embedding_model: text-embedding-ada-002
        temperature: 0.5
        vision_max_tokens: 1024
        timeout_secs: 60
        embedding_window_words: 3000
        embedding_batch_size: 64
        "###);
    }

    #[test]
    fn test_generation_configs() {
        let client = OpenAIClient::new(OpenAIConfig::new("sk-test")).unwrap();

        let text = client.text_config();
        assert_eq!(text.model_id, "gpt-4o-mini");
        assert_eq!(text.temperature, Some(0.5));
        assert_eq!(text.max_tokens, None);

        let vision = client.vision_config();
        assert_eq!(vision.max_tokens, Some(1024));
        assert_eq!(vision.timeout.as_secs(), 60);
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        assert!(OpenAIClient::new(OpenAIConfig::new("   ")).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = OpenAIConfig::new("sk-test");
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_embedding_batch_is_rejected() {
        let mut config = OpenAIConfig::new("sk-test");
        config.embedding_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = OpenAIConfig::from_env_with_key(Some("sk-from-flag".to_string())).unwrap();
        assert_eq!(config.api_key, "sk-from-flag");
    }
}
