//! Common types used across the docchat system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for retry behavior of generation calls
///
/// The default is a single attempt per question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Delay before the given (1-based) retry attempt, doubling each time and capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let capped = attempt.saturating_sub(1).min(5);
        self.backoff * (1u32 << capped)
    }
}

/// One answered exchange in a chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        let retry = RetryConfig {
            max_attempts: 10,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(100));
        assert_eq!(retry.delay_for(2), Duration::from_millis(200));
        assert_eq!(retry.delay_for(3), Duration::from_millis(400));
        assert_eq!(retry.delay_for(20), Duration::from_millis(3200));
    }

    #[test]
    fn test_default_is_single_attempt() {
        assert_eq!(RetryConfig::default().max_attempts, 1);
    }
}
