use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::classify::{in_window, rules, Classify};
use crate::config::LlmConfig;
use crate::error::{MomentaError, Result};
use crate::llm::{prompts, CompletionOptions, LlmProvider, JSON_SYSTEM_PROMPT};
use crate::models::{cap_tags, Category, ClassificationResult, Mood, Theme, Thread};

/// Raw JSON shape returned by the model; normalized before leaving this
/// module so the rest of the engine never sees model quirks.
#[derive(Debug, Deserialize)]
struct RawClassification {
    category: RawCategory,
    title: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    mood: Option<Mood>,
    decoration_variant: Option<i64>,
    merge_target_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: Option<String>,
    theme: Option<Theme>,
}

/// Remote-model classification strategy.
pub struct LlmClassifier {
    llm: LlmProvider,
    merge_window_ms: i64,
    timeout: Duration,
}

impl LlmClassifier {
    pub fn new(llm: LlmProvider, config: &LlmConfig, merge_window_secs: u64) -> Self {
        Self {
            llm,
            merge_window_ms: (merge_window_secs as i64) * 1000,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn normalize(
        &self,
        raw: RawClassification,
        content: &str,
        candidates: &[&Thread],
    ) -> ClassificationResult {
        let theme = raw.category.theme.unwrap_or(Theme::Life);
        let name = raw
            .category
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "生活杂记".to_string());

        // Hallucinated merge targets are discarded: the id must name one of
        // the in-window candidates that were actually offered.
        let merge_target_id = raw
            .merge_target_id
            .filter(|id| candidates.iter().any(|t| t.id == *id));

        let title = match &merge_target_id {
            Some(id) => candidates
                .iter()
                .find(|t| t.id == *id)
                .map(|t| t.title.clone())
                .unwrap_or_default(),
            None => raw
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "生活记录".to_string()),
        };

        let decoration_variant = match raw.decoration_variant {
            Some(v) if (0..50).contains(&v) => v as u8,
            _ => rules::decoration_variant(content, &name),
        };

        ClassificationResult {
            merge_target_id,
            title,
            category: Category { name, theme },
            tags: cap_tags(raw.tags),
            mood: raw.mood.unwrap_or_else(|| Mood::default_for(theme)),
            decoration_variant,
        }
    }
}

#[async_trait]
impl Classify for LlmClassifier {
    async fn classify(&self, content: &str, open_threads: &[Thread]) -> Result<ClassificationResult> {
        let now_ms = Utc::now().timestamp_millis();
        let candidates: Vec<&Thread> = open_threads
            .iter()
            .filter(|thread| in_window(thread, now_ms, self.merge_window_ms))
            .collect();

        let candidate_rows: Vec<(&str, &str, &str)> = candidates
            .iter()
            .map(|t| (t.id.as_str(), t.title.as_str(), t.category.name.as_str()))
            .collect();

        let prompt = prompts::classification_prompt(content, &candidate_rows);
        let options = CompletionOptions {
            temperature: Some(0.3),
            max_tokens: Some(1024),
        };

        let call = self
            .llm
            .complete_json(&prompt, Some(JSON_SYSTEM_PROMPT), Some(&options));
        let value = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| MomentaError::Llm("Classification call timed out".to_string()))??;

        let raw: RawClassification = serde_json::from_value(value)
            .map_err(|e| MomentaError::Llm(format!("Classification response malformed: {e}")))?;

        Ok(self.normalize(raw, content, &candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entry;

    fn classifier() -> LlmClassifier {
        LlmClassifier::new(
            LlmProvider::unavailable("tests"),
            &LlmConfig {
                model: "ollama/test".to_string(),
                api_key: None,
                base_url: None,
                timeout_secs: 5,
                max_retries: 0,
                intent_timeout_secs: 5,
                revalidation_timeout_secs: 5,
            },
            3600,
        )
    }

    fn candidate(title: &str) -> Thread {
        Thread::open(
            title,
            Category {
                name: "业务研发".to_string(),
                theme: Theme::Work,
            },
            Vec::new(),
            Mood::Focused,
            1,
            Entry::new("seed", 0, Vec::new()),
        )
    }

    fn raw(merge_target_id: Option<String>, decoration: Option<i64>) -> RawClassification {
        RawClassification {
            category: RawCategory {
                name: Some("业务研发".to_string()),
                theme: Some(Theme::Work),
            },
            title: Some("付费墙豁免".to_string()),
            tags: vec!["付费墙".to_string(), "付费墙".to_string(), "数据源".to_string()],
            mood: Some(Mood::Proud),
            decoration_variant: decoration,
            merge_target_id,
        }
    }

    #[test]
    fn hallucinated_merge_target_is_nulled() {
        let threads = vec![candidate("付费墙豁免")];
        let refs: Vec<&Thread> = threads.iter().collect();
        let result = classifier().normalize(raw(Some("th_ghost".to_string()), Some(22)), "内容", &refs);
        assert_eq!(result.merge_target_id, None);
    }

    #[test]
    fn valid_merge_target_keeps_existing_title() {
        let threads = vec![candidate("付费墙豁免")];
        let refs: Vec<&Thread> = threads.iter().collect();
        let id = threads[0].id.clone();
        let result = classifier().normalize(raw(Some(id.clone()), Some(22)), "内容", &refs);
        assert_eq!(result.merge_target_id, Some(id));
        assert_eq!(result.title, "付费墙豁免");
    }

    #[test]
    fn out_of_range_decoration_falls_back_to_hash() {
        let result = classifier().normalize(raw(None, Some(99)), "数据源付费墙豁免问题已解决", &[]);
        assert!(u32::from(result.decoration_variant) < 50);
        assert_eq!(
            result.decoration_variant,
            rules::decoration_variant("数据源付费墙豁免问题已解决", "业务研发")
        );
    }

    #[test]
    fn duplicate_tags_are_collapsed() {
        let result = classifier().normalize(raw(None, Some(1)), "内容", &[]);
        assert_eq!(result.tags, vec!["付费墙", "数据源"]);
    }
}
