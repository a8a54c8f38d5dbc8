//! Per-session chat state

use uuid::Uuid;

use docchat_core::{ConversationTurn, Error, LLMProvider, RetrievalResult, Retriever};

use crate::memory::ConversationMemory;
use crate::orchestrator::{Answer, ConversationOrchestrator};

/// Outcome of one question
#[derive(Debug)]
pub enum TurnOutcome {
    Answered(Answer),
    Failed(Error),
}

/// Everything one chat session owns: its memory, the visible history and the sources
/// of the last answer
pub struct SessionState<M: LLMProvider + ?Sized> {
    pub id: Uuid,
    pub memory: ConversationMemory<M>,
    pub history: Vec<ConversationTurn>,
    pub last_sources: Option<RetrievalResult>,
}

impl<M: LLMProvider + ?Sized> SessionState<M> {
    pub fn new(memory: ConversationMemory<M>) -> Self {
        Self {
            id: Uuid::new_v4(),
            memory,
            history: Vec::new(),
            last_sources: None,
        }
    }

    /// Run one turn and hand the (possibly updated) state back with its outcome.
    ///
    /// Failed turns change nothing.
    pub async fn handle_question<L, R>(
        mut self,
        orchestrator: &ConversationOrchestrator<L, R>,
        question: &str,
    ) -> (Self, TurnOutcome)
    where
        L: LLMProvider + ?Sized,
        R: Retriever + ?Sized,
    {
        match orchestrator.answer(question, &mut self.memory).await {
            Ok(answer) => {
                self.history
                    .push(ConversationTurn::new(question.trim(), answer.text.clone()));
                self.last_sources = Some(answer.sources.clone());
                (self, TurnOutcome::Answered(answer))
            }
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "Turn failed");
                (self, TurnOutcome::Failed(e))
            }
        }
    }

    /// Forget the conversation but keep the session id
    pub fn reset(&mut self) {
        self.memory.clear();
        self.history.clear();
        self.last_sources = None;
    }
}
