//! Intent routing: is this input a search query or a new record?
//!
//! Fails open to `record` — the cheaper, always-available path — on every
//! remote problem, because mistaking a record for a search loses data while
//! the reverse only costs one extra card.

use std::time::Duration;

use serde::Deserialize;

use crate::config::LlmConfig;
use crate::llm::{prompts, CompletionOptions, LlmProvider, JSON_SYSTEM_PROMPT};
use crate::models::IntentResult;

#[derive(Debug, Deserialize)]
struct RawIntent {
    intent: Option<String>,
    query: Option<String>,
}

pub struct IntentRouter {
    llm: LlmProvider,
    timeout: Duration,
}

impl IntentRouter {
    pub fn new(llm: LlmProvider, config: Option<&LlmConfig>) -> Self {
        let timeout = Duration::from_secs(config.map(|c| c.intent_timeout_secs).unwrap_or(15));
        Self { llm, timeout }
    }

    /// Pure function of the input and the remote service state; no side
    /// effects beyond the one bounded remote call.
    pub async fn route(&self, input: &str) -> IntentResult {
        let trimmed = input.trim();

        // Trivial inputs are always records; don't spend a remote call.
        if trimmed.chars().count() <= 1 {
            return IntentResult::record();
        }

        if !self.llm.is_available() {
            return IntentResult::record();
        }

        let prompt = prompts::intent_prompt(trimmed);
        let options = CompletionOptions {
            temperature: Some(0.1),
            max_tokens: Some(256),
        };

        let call = self
            .llm
            .complete_json(&prompt, Some(JSON_SYSTEM_PROMPT), Some(&options));

        let value = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => {
                tracing::warn!(%error, "Intent routing failed, treating input as record");
                return IntentResult::record();
            }
            Err(_) => {
                tracing::warn!("Intent routing timed out, treating input as record");
                return IntentResult::record();
            }
        };

        let raw: RawIntent = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "Intent response malformed, treating input as record");
                return IntentResult::record();
            }
        };

        match raw.intent.as_deref().map(str::to_lowercase).as_deref() {
            Some("search") => {
                let query = raw
                    .query
                    .map(|q| q.trim().to_string())
                    .filter(|q| !q.is_empty());
                IntentResult::search(query)
            }
            _ => IntentResult::record(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Intent;

    fn router() -> IntentRouter {
        IntentRouter::new(LlmProvider::unavailable("tests"), None)
    }

    #[tokio::test]
    async fn empty_input_is_a_record_without_a_call() {
        let result = router().route("   ").await;
        assert_eq!(result.intent, Intent::Record);
        assert!(result.rewritten_query.is_none());
    }

    #[tokio::test]
    async fn single_character_is_a_record() {
        let result = router().route("嗯").await;
        assert_eq!(result.intent, Intent::Record);
    }

    #[tokio::test]
    async fn unavailable_llm_fails_open_to_record() {
        let result = router().route("上次付费墙的方案是怎么定的？").await;
        assert_eq!(result.intent, Intent::Record);
    }
}
