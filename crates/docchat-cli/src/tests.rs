//! End-to-end tests over a real index with a scripted generation model

#[cfg(test)]
mod session_tests {
    use crate::{ConversationMemory, ConversationOrchestrator, SessionState, TurnOutcome};
    use async_trait::async_trait;
    use docchat_core::{
        ChunkingConfig, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
        SourceDocument,
    };
    use docchat_rag::{CorpusChunker, FlatIndex, HashingEmbedder, IndexBuilder, MmrRetriever};
    use insta::assert_yaml_snapshot;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    struct Switchable {
        down: AtomicBool,
    }

    #[async_trait]
    impl LLMProvider for Switchable {
        async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
            self.generate_with_config(prompt, &GenerationConfig::default()).await
        }

        async fn generate_with_config(&self, _prompt: &str, config: &GenerationConfig) -> Result<GenerationResult> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Error::Generation("quota exceeded".to_string()));
            }
            Ok(GenerationResult {
                text: "- Answers are written **async first**.".to_string(),
                model_id: config.model_id.clone(),
                tokens_used: None,
            })
        }

        fn model_id(&self) -> &str {
            "switchable"
        }
    }

    async fn saved_index(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("vector_index");
        let docs = vec![
            SourceDocument::new(
                "handbook",
                "## SECTION: Communication\nWe prefer asynchronous communication and write things down.\n\
                 ## SECTION: Values\nCollaboration, Results, Efficiency, Diversity, Iteration, Transparency.",
            ),
            SourceDocument::new(
                "direction",
                "## SECTION: Vision\nA single application for the whole software development lifecycle.",
            ),
        ];
        IndexBuilder::new(
            CorpusChunker::new(ChunkingConfig::default()).unwrap(),
            Arc::new(HashingEmbedder::default()),
        )
        .build_and_save(&docs, &path)
        .await
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_session_over_persisted_index() {
        let dir = TempDir::new().unwrap();
        let path = saved_index(&dir).await;

        let embedder = Arc::new(HashingEmbedder::default());
        let index = Arc::new(FlatIndex::load_for(&path, embedder.as_ref()).unwrap());
        let retriever = Arc::new(MmrRetriever::new(embedder, index));
        let llm = Arc::new(Switchable { down: AtomicBool::new(false) });
        let orchestrator = ConversationOrchestrator::new(llm.clone(), retriever);

        let state = SessionState::new(ConversationMemory::new(llm.clone()));
        let (state, outcome) = state
            .handle_question(&orchestrator, "How do we prefer asynchronous communication?")
            .await;

        let TurnOutcome::Answered(answer) = outcome else {
            panic!("expected an answer");
        };
        assert_eq!(answer.sources.chunks[0].chunk.metadata.source, "handbook");

        let provenance: Vec<String> = answer
            .sources
            .chunks
            .iter()
            .map(|c| format!("{} → {}", c.chunk.metadata.source, c.chunk.metadata.section))
            .collect();
        assert_eq!(provenance.len(), 3);
        assert_eq!(provenance[0], "handbook → Communication");

        llm.down.store(true, Ordering::SeqCst);
        let (state, outcome) = state.handle_question(&orchestrator, "And the values?").await;
        assert!(matches!(outcome, TurnOutcome::Failed(Error::Generation(_))));

        let questions: Vec<&str> = state.history.iter().map(|t| t.question.as_str()).collect();
        assert_yaml_snapshot!(questions, @"- How do we prefer asynchronous communication?");
        assert_eq!(state.memory.turns_recorded(), 1);
    }

    #[tokio::test]
    async fn test_missing_index_is_index_load_error() {
        let dir = TempDir::new().unwrap();
        let err = FlatIndex::load_for(&dir.path().join("nope"), &HashingEmbedder::default()).unwrap_err();
        assert!(matches!(err, Error::IndexLoad(_)));
    }
}
