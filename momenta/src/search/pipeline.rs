use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use crate::config::LlmConfig;
use crate::llm::{prompts, CompletionOptions, LlmProvider, JSON_SYSTEM_PROMPT};
use crate::models::Thread;
use crate::search::cosine_similarity;

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub thread: Thread,
    pub similarity: f32,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    relevant_indices: Vec<usize>,
}

/// Two-stage semantic search: brute-force cosine recall over the in-memory
/// corpus, then an LLM re-validation pass that discards recalled-but-
/// irrelevant candidates. Stage 2 is advisory — every failure degrades to
/// stage 1's output rather than failing the search.
pub struct SearchPipeline {
    llm: LlmProvider,
    timeout: Duration,
}

impl SearchPipeline {
    pub fn new(llm: LlmProvider, config: Option<&LlmConfig>) -> Self {
        let timeout =
            Duration::from_secs(config.map(|c| c.revalidation_timeout_secs).unwrap_or(15));
        Self { llm, timeout }
    }

    pub async fn search(
        &self,
        query_vector: &[f32],
        corpus: &[Thread],
        original_query: &str,
        threshold: f32,
        max_results: usize,
    ) -> Vec<SearchHit> {
        let recalled = recall(query_vector, corpus, threshold, max_results);
        if recalled.is_empty() {
            return recalled;
        }

        if original_query.trim().is_empty() || !self.llm.is_available() {
            return recalled;
        }

        match self.revalidate(original_query, &recalled).await {
            Some(kept) => kept,
            None => recalled,
        }
    }

    /// Stage 2: strict reviewer. `None` means the pass could not run and the
    /// caller should fall back to the coarse ranking.
    async fn revalidate(&self, query: &str, recalled: &[SearchHit]) -> Option<Vec<SearchHit>> {
        let candidates: Vec<(String, String)> = recalled
            .iter()
            .map(|hit| (hit.thread.title.clone(), hit.thread.joined_content()))
            .collect();

        let prompt = prompts::revalidation_prompt(query, &candidates);
        let options = CompletionOptions {
            temperature: Some(0.1),
            max_tokens: Some(512),
        };

        let call = self
            .llm
            .complete_json(&prompt, Some(JSON_SYSTEM_PROMPT), Some(&options));

        let value = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => {
                tracing::warn!(%error, "Search re-validation failed, returning coarse results");
                return None;
            }
            Err(_) => {
                tracing::warn!("Search re-validation timed out, returning coarse results");
                return None;
            }
        };

        let verdict: RawVerdict = match serde_json::from_value(value) {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::warn!(%error, "Re-validation verdict malformed, returning coarse results");
                return None;
            }
        };

        let kept: HashSet<usize> = verdict
            .relevant_indices
            .into_iter()
            .filter(|index| *index < recalled.len())
            .collect();

        tracing::debug!(
            recalled = recalled.len(),
            kept = kept.len(),
            "Search re-validation applied"
        );

        Some(
            recalled
                .iter()
                .enumerate()
                .filter(|(index, _)| kept.contains(index))
                .map(|(_, hit)| hit.clone())
                .collect(),
        )
    }
}

/// Stage 1: coarse recall. Only threads carrying a non-empty embedding
/// participate; results are sorted by descending similarity, thresholded,
/// and truncated.
fn recall(
    query_vector: &[f32],
    corpus: &[Thread],
    threshold: f32,
    max_results: usize,
) -> Vec<SearchHit> {
    if query_vector.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<SearchHit> = corpus
        .iter()
        .filter(|thread| thread.has_embedding())
        .filter_map(|thread| {
            let embedding = thread.embedding.as_deref()?;
            let similarity = cosine_similarity(query_vector, embedding);
            (similarity >= threshold).then(|| SearchHit {
                thread: thread.clone(),
                similarity,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(max_results);
    scored
}
