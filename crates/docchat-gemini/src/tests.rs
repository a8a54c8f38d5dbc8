//! Snapshot tests for the Gemini clients

#[cfg(test)]
mod snapshot_tests {
    use crate::client::build_request;
    use crate::{GeminiConfig, GenerationConfig};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_config_snapshot() {
        let config = GeminiConfig::new("test_api_key_redacted");

        assert_yaml_snapshot!(config, @r#"
        api_url: "https://generativelanguage.googleapis.com"
        model_id: gemini-1.5-flash
        embedding_model: text-embedding-004
        "#);
    }

    #[test]
    fn test_generate_request_snapshot() {
        let config = GenerationConfig {
            temperature: None,
            stop_sequences: vec!["Question:".to_string()],
            ..Default::default()
        };

        assert_yaml_snapshot!(build_request("What are the CREDIT values?", &config), @r#"
        contents:
          - role: user
            parts:
              - text: What are the CREDIT values?
        generationConfig:
          maxOutputTokens: 2048
          stopSequences:
            - "Question:"
        "#);
    }
}
