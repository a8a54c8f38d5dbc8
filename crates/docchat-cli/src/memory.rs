//! Summary-buffer conversation memory
//!
//! Recent turns are kept verbatim. Once the rendered memory grows past its character
//! budget, the oldest turns are folded into a running summary written by the
//! generation model. The rendered memory never exceeds the budget.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

use docchat_core::{ConversationTurn, GenerationConfig, LLMProvider, Result};

/// Longest question excerpt kept per pruned turn when summarization falls back
const EXTRACT_CHARS: usize = 120;

/// Configuration for [`ConversationMemory`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Upper bound on `summary().chars().count()`
    pub max_chars: usize,
    pub summary_max_tokens: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_chars: 4000,
            summary_max_tokens: 512,
        }
    }
}

pub struct ConversationMemory<L: LLMProvider + ?Sized> {
    llm: Arc<L>,
    config: MemoryConfig,
    summary: String,
    recent: VecDeque<ConversationTurn>,
    turns_recorded: usize,
}

impl<L: LLMProvider + ?Sized> ConversationMemory<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self::with_config(llm, MemoryConfig::default())
    }

    pub fn with_config(llm: Arc<L>, config: MemoryConfig) -> Self {
        Self {
            llm,
            config,
            summary: String::new(),
            recent: VecDeque::new(),
            turns_recorded: 0,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Record a completed turn, compressing older turns if the budget is exceeded.
    ///
    /// Never fails: when the summarizer errors, pruned turns are compressed
    /// extractively instead.
    pub async fn append(&mut self, turn: ConversationTurn) {
        self.recent.push_back(turn);
        self.turns_recorded += 1;

        loop {
            let mut pruned = Vec::new();
            while self.rendered_len() > self.config.max_chars && self.recent.len() > 1 {
                if let Some(oldest) = self.recent.pop_front() {
                    pruned.push(oldest);
                }
            }
            if pruned.is_empty() {
                break;
            }
            self.fold(&pruned).await;
        }
    }

    /// Rendered memory (running summary followed by verbatim recent turns)
    pub fn summary(&self) -> String {
        let max = self.config.max_chars;
        let rendered = self.render();
        if rendered.chars().count() <= max {
            return rendered;
        }

        // Over budget only when a verbatim answer is too long: shorten answers so the
        // summary header and the questions survive, newest answer first in line.
        let skeleton = self.render_answers(Some(&vec![String::new(); self.recent.len()]));
        let skeleton_len = skeleton.chars().count();
        if skeleton_len > max {
            return head_chars(&rendered, max);
        }

        let mut budget = max - skeleton_len;
        let mut answers = vec![String::new(); self.recent.len()];
        for (slot, turn) in answers.iter_mut().zip(&self.recent).rev() {
            let answer = head_chars(turn.answer.trim(), budget);
            budget -= answer.chars().count();
            *slot = answer;
        }
        self.render_answers(Some(&answers))
    }

    /// Number of turns still held verbatim
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns_recorded == 0
    }

    /// Number of turns appended since creation or the last [`clear`](Self::clear)
    pub fn turns_recorded(&self) -> usize {
        self.turns_recorded
    }

    pub fn recent_turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.recent.iter()
    }

    pub fn clear(&mut self) {
        self.summary.clear();
        self.recent.clear();
        self.turns_recorded = 0;
    }

    async fn fold(&mut self, pruned: &[ConversationTurn]) {
        let budget = self.config.max_chars / 2;
        let folded = match self.summarize(pruned).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, pruned = pruned.len(), "Summarizing memory failed, compressing extractively");
                self.extractive(pruned)
            }
        };
        self.summary = tail_chars(folded.trim(), budget);
        debug!(
            pruned = pruned.len(),
            summary_chars = self.summary.chars().count(),
            "Folded turns into memory summary"
        );
    }

    async fn summarize(&self, pruned: &[ConversationTurn]) -> Result<String> {
        let prompt = summarization_prompt(&self.summary, pruned);
        let config = GenerationConfig {
            model_id: self.llm.model_id().to_string(),
            max_tokens: self.config.summary_max_tokens,
            ..Default::default()
        };
        Ok(self.llm.generate_with_config(&prompt, &config).await?.text)
    }

    fn extractive(&self, pruned: &[ConversationTurn]) -> String {
        let mut out = self.summary.clone();
        for turn in pruned {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("- The user asked: ");
            out.push_str(&head_chars(turn.question.trim(), EXTRACT_CHARS));
        }
        out
    }

    fn render(&self) -> String {
        self.render_answers(None)
    }

    /// Render with the given answer texts in place of the recorded ones
    fn render_answers(&self, answers: Option<&[String]>) -> String {
        let mut out = String::new();
        if !self.summary.is_empty() {
            out.push_str("Summary of earlier conversation:\n");
            out.push_str(&self.summary);
            out.push_str("\n\n");
        }
        for (i, turn) in self.recent.iter().enumerate() {
            let answer = answers
                .and_then(|a| a.get(i))
                .map_or(turn.answer.as_str(), String::as_str);
            out.push_str(&render_exchange(&turn.question, answer));
        }
        out
    }

    fn rendered_len(&self) -> usize {
        self.render().chars().count()
    }
}

fn render_exchange(question: &str, answer: &str) -> String {
    format!("Human: {}\nAssistant: {}\n", question.trim(), answer.trim())
}

fn render_turn(turn: &ConversationTurn) -> String {
    render_exchange(&turn.question, &turn.answer)
}

fn summarization_prompt(current: &str, pruned: &[ConversationTurn]) -> String {
    let lines: String = pruned.iter().map(render_turn).collect();
    let current = if current.is_empty() { "(none yet)" } else { current };
    format!(
        "Progressively summarize the lines of conversation provided, adding onto the previous summary \
        and returning a new summary. Keep names, numbers and the topics the user cares about. \
        Answer with the summary only.\n\
        \n\
        Current summary:\n\
        {}\n\
        \n\
        New lines of conversation:\n\
        {}\n\
        New summary:",
        current, lines
    )
}

/// Keep at most `max` characters, marking a cut with `...` when there is room for it
fn head_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Keep the last `max` characters
fn tail_chars(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    text.chars().skip(len - max).collect()
}
