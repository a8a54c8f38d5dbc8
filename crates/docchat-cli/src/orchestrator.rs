//! Conversation orchestrator: retrieval, grounding prompt, generation, memory

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use docchat_core::{
    ConversationTurn, Error, GenerationConfig, LLMProvider, Result, RetrievalResult, Retriever,
    RetryConfig,
};

use crate::memory::ConversationMemory;
use crate::prompt::{condense_prompt, grounding_prompt};

/// An answer together with the passages it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: RetrievalResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
    /// Rewrite follow-ups into standalone questions before retrieval
    pub condense_followups: bool,
}

/// Answers questions against a retriever and a generation model
pub struct ConversationOrchestrator<L: LLMProvider + ?Sized, R: Retriever + ?Sized> {
    llm: Arc<L>,
    retriever: Arc<R>,
    config: OrchestratorConfig,
}

impl<L: LLMProvider + ?Sized, R: Retriever + ?Sized> ConversationOrchestrator<L, R> {
    pub fn new(llm: Arc<L>, retriever: Arc<R>) -> Self {
        Self::with_config(llm, retriever, OrchestratorConfig::default())
    }

    pub fn with_config(llm: Arc<L>, retriever: Arc<R>, config: OrchestratorConfig) -> Self {
        Self {
            llm,
            retriever,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Answer one question.
    ///
    /// Memory is only updated when both retrieval and generation succeed.
    pub async fn answer<M: LLMProvider + ?Sized>(
        &self,
        question: &str,
        memory: &mut ConversationMemory<M>,
    ) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        let started = Instant::now();
        let history = memory.summary();

        let search_query = if self.config.condense_followups && !memory.is_empty() {
            self.condense(question, &history).await?
        } else {
            question.to_string()
        };

        let sources = self
            .retriever
            .retrieve(&search_query)
            .await
            .map_err(into_retrieval)?;

        let prompt = grounding_prompt(question, &sources, &history);
        let result = self
            .llm
            .generate_with_retry(&prompt, &self.config.generation, &self.config.retry)
            .await
            .map_err(into_generation)?;

        memory.append(ConversationTurn::new(question, result.text.clone())).await;

        info!(
            passages = sources.len(),
            tokens = ?result.tokens_used,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(Answer {
            text: result.text,
            sources,
        })
    }

    async fn condense(&self, question: &str, history: &str) -> Result<String> {
        let prompt = condense_prompt(question, history);
        let result = self
            .llm
            .generate_with_retry(&prompt, &self.config.generation, &self.config.retry)
            .await
            .map_err(into_generation)?;

        let standalone = result.text.trim();
        if standalone.is_empty() {
            return Ok(question.to_string());
        }
        debug!(original = question, standalone, "Condensed follow-up");
        Ok(standalone.to_string())
    }
}

fn into_retrieval(e: Error) -> Error {
    match e {
        Error::Retrieval(_) => e,
        other => Error::Retrieval(other.to_string()),
    }
}

fn into_generation(e: Error) -> Error {
    match e {
        Error::Generation(_) => e,
        other => Error::Generation(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docchat_core::{Chunk, ChunkMetadata, GenerationResult, ScoredChunk};
    use std::sync::Mutex;

    /// Generation model that replays scripted replies and records prompts
    struct Scripted {
        replies: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
            self.generate_with_config(prompt, &GenerationConfig::default()).await
        }

        async fn generate_with_config(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationResult> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.is_empty() {
                Ok("default reply".to_string())
            } else {
                replies.remove(0)
            };
            reply.map(|text| GenerationResult {
                text,
                model_id: config.model_id.clone(),
                tokens_used: Some(7),
            })
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    struct FixedRetriever {
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl FixedRetriever {
        fn ok() -> Self {
            Self { fail: false, queries: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { fail: true, queries: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(Error::IndexLoad("index went away".to_string()));
            }
            Ok(RetrievalResult {
                query: query.to_string(),
                chunks: vec![ScoredChunk {
                    chunk: Chunk {
                        id: "c1".to_string(),
                        content: "Everyone can contribute.".to_string(),
                        metadata: ChunkMetadata {
                            source: "handbook".to_string(),
                            section: "Mission".to_string(),
                        },
                    },
                    score: 0.9,
                }],
            })
        }
    }

    fn memory() -> ConversationMemory<Scripted> {
        ConversationMemory::new(Arc::new(Scripted::new(Vec::new())))
    }

    #[tokio::test]
    async fn test_answer_records_turn_and_sources() {
        let llm = Arc::new(Scripted::new(vec![Ok("Everyone can contribute.".to_string())]));
        let orchestrator = ConversationOrchestrator::new(llm.clone(), Arc::new(FixedRetriever::ok()));
        let mut memory = memory();

        let answer = orchestrator.answer("What is the mission?", &mut memory).await.unwrap();

        assert_eq!(answer.text, "Everyone can contribute.");
        assert_eq!(answer.sources.chunks[0].chunk.metadata.section, "Mission");
        assert_eq!(memory.turns_recorded(), 1);
        assert!(llm.prompts.lock().unwrap()[0].contains("[1] handbook → Mission"));
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_memory_untouched() {
        let llm = Arc::new(Scripted::new(vec![
            Ok("first".to_string()),
            Err(Error::Network("503 from upstream".to_string())),
        ]));
        let orchestrator = ConversationOrchestrator::new(llm, Arc::new(FixedRetriever::ok()));
        let mut memory = memory();

        orchestrator.answer("first question", &mut memory).await.unwrap();
        let before = memory.summary();

        let err = orchestrator.answer("second question", &mut memory).await.unwrap_err();
        assert!(matches!(err, Error::Generation(ref m) if m.contains("503")));
        assert_eq!(memory.turns_recorded(), 1);
        assert_eq!(memory.summary(), before);
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_distinguished() {
        let llm = Arc::new(Scripted::new(Vec::new()));
        let orchestrator = ConversationOrchestrator::new(llm.clone(), Arc::new(FixedRetriever::failing()));
        let mut memory = memory();

        let err = orchestrator.answer("anything", &mut memory).await.unwrap_err();
        assert!(matches!(err, Error::Retrieval(_)));
        assert!(memory.is_empty());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected_before_any_call() {
        let retriever = Arc::new(FixedRetriever::ok());
        let orchestrator = ConversationOrchestrator::new(Arc::new(Scripted::new(Vec::new())), retriever.clone());
        let mut memory = memory();

        let err = orchestrator.answer("   \n", &mut memory).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(retriever.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_followups_are_condensed_when_enabled() {
        let llm = Arc::new(Scripted::new(vec![
            Ok("Values are CREDIT.".to_string()),
            Ok("What does the R in CREDIT stand for?".to_string()),
            Ok("Results.".to_string()),
        ]));
        let retriever = Arc::new(FixedRetriever::ok());
        let config = OrchestratorConfig {
            condense_followups: true,
            ..Default::default()
        };
        let orchestrator = ConversationOrchestrator::with_config(llm, retriever.clone(), config);
        let mut memory = memory();

        orchestrator.answer("What are the values?", &mut memory).await.unwrap();
        let answer = orchestrator.answer("and the R?", &mut memory).await.unwrap();

        assert_eq!(answer.text, "Results.");
        let queries = retriever.queries.lock().unwrap();
        assert_eq!(queries[0], "What are the values?");
        assert_eq!(queries[1], "What does the R in CREDIT stand for?");
    }

    #[tokio::test]
    async fn test_memory_reaches_the_prompt() {
        let llm = Arc::new(Scripted::new(Vec::new()));
        let orchestrator = ConversationOrchestrator::new(llm.clone(), Arc::new(FixedRetriever::ok()));
        let mut memory = memory();

        orchestrator.answer("first question", &mut memory).await.unwrap();
        orchestrator.answer("second question", &mut memory).await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[1].contains("Human: first question"));
    }
}
