//! Daily digest synthesis with fingerprint-based caching.
//!
//! Opening the "today" view is frequent and the digest prompt is the largest
//! in the engine, so recomputation is gated on a cheap content fingerprint:
//! entry count plus newest update time. Same fingerprint, same digest, zero
//! remote calls.

mod cache;

pub use cache::{CachedDigest, SummaryCache};

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::SummaryConfig;
use crate::llm::{prompts, CompletionOptions, LlmProvider, JSON_SYSTEM_PROMPT};
use crate::models::{DailySummary, DeepMemory, Entry, TaskItem, Thread};

/// Cache-validity token for one day's thread set.
pub fn fingerprint(threads: &[Thread]) -> String {
    let entry_count: usize = threads.iter().map(|t| t.entries.len()).sum();
    let max_updated = threads.iter().map(|t| t.last_updated_at).max().unwrap_or(0);
    format!("{entry_count}_{max_updated}")
}

fn clock_label(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|utc| utc.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    weather: Option<String>,
    poetic: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    deep_memories: Vec<RawDeepMemory>,
    #[serde(default)]
    tasks: Vec<RawTask>,
}

#[derive(Debug, Deserialize)]
struct RawDeepMemory {
    entry_id: Option<String>,
    time: Option<String>,
    core_summary: Option<String>,
    poetic_interpretation: Option<String>,
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    content: Option<String>,
    #[serde(default)]
    is_completed: bool,
}

pub struct DailySummarizer {
    llm: LlmProvider,
    cache: SummaryCache,
    timeout: Duration,
}

impl DailySummarizer {
    pub fn new(llm: LlmProvider, config: &SummaryConfig) -> Self {
        Self {
            llm,
            cache: SummaryCache::new(config.cache_size),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Produce the digest for `date_label`, reading the cache when the
    /// fingerprint of `todays_threads` is unchanged and `force_refresh` is
    /// off. Never errors: every failure path lands on the deterministic
    /// fallback digest.
    pub async fn summarize(
        &self,
        todays_threads: &[Thread],
        date_label: &str,
        force_refresh: bool,
    ) -> DailySummary {
        if todays_threads.is_empty() {
            return DailySummary::fallback(0);
        }

        let fingerprint = fingerprint(todays_threads);

        if !force_refresh {
            if let Some(cached) = self.cache.get(date_label) {
                if cached.fingerprint == fingerprint {
                    tracing::debug!(date = date_label, "Daily digest cache hit");
                    return cached.data;
                }
            }
        }

        let entry_count: usize = todays_threads.iter().map(|t| t.entries.len()).sum();

        // No credential, no attempt — and nothing worth caching either,
        // since no remote call would be saved.
        if !self.llm.is_available() {
            return DailySummary::fallback(entry_count);
        }

        let digest = match self.generate(todays_threads, date_label).await {
            Ok(digest) => digest,
            Err(error) => {
                tracing::warn!(%error, "Daily digest generation failed, using fallback");
                DailySummary::fallback(entry_count)
            }
        };

        // The fallback is cached too: a failed generation should not be
        // retried on every render, only when the day's content changes.
        self.cache.put(
            date_label.to_string(),
            CachedDigest {
                fingerprint,
                data: digest.clone(),
            },
        );

        digest
    }

    async fn generate(
        &self,
        todays_threads: &[Thread],
        date_label: &str,
    ) -> crate::error::Result<DailySummary> {
        let entries = chronological_entries(todays_threads);
        let event_lines = serialize_entries(&entries);

        let prompt = prompts::daily_summary_prompt(date_label, &event_lines);
        let options = CompletionOptions {
            temperature: Some(0.7),
            max_tokens: Some(2048),
        };

        let call = self
            .llm
            .complete_json(&prompt, Some(JSON_SYSTEM_PROMPT), Some(&options));
        let value = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| crate::error::MomentaError::Llm("Digest call timed out".to_string()))??;

        let raw: RawSummary = serde_json::from_value(value)?;
        Ok(assemble(raw, &entries))
    }
}

/// Flatten all entries across today's threads into one time-ordered list.
fn chronological_entries(threads: &[Thread]) -> Vec<&Entry> {
    let mut entries: Vec<&Entry> = threads.iter().flat_map(|t| t.entries.iter()).collect();
    entries.sort_by_key(|entry| entry.timestamp);
    entries
}

/// Compact plain-line serialization; structured JSON would triple the prompt
/// size for no gain.
fn serialize_entries(entries: &[&Entry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let mut line = format!(
                "{} | {} | {}",
                entry.id,
                clock_label(entry.timestamp),
                entry.content
            );
            if let Some(media) = entry.attachments.first() {
                line.push_str(&format!(" | media:{}", media.url));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn assemble(raw: RawSummary, entries: &[&Entry]) -> DailySummary {
    let by_id: HashMap<&str, &Entry> = entries.iter().map(|e| (e.id.as_str(), *e)).collect();

    // At most one highlight, and only one whose entry id actually resolves —
    // the same defense applied to hallucinated merge targets.
    let deep_memories: Vec<DeepMemory> = raw
        .deep_memories
        .into_iter()
        .filter_map(|raw_memory| {
            let id = raw_memory.entry_id?;
            let entry = match by_id.get(id.as_str()) {
                Some(entry) => *entry,
                None => {
                    tracing::warn!(entry_id = %id, "Digest referenced an unknown entry, dropping highlight");
                    return None;
                }
            };
            Some(DeepMemory {
                source_entry_id: id,
                time: raw_memory
                    .time
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| clock_label(entry.timestamp)),
                core_summary: raw_memory.core_summary.unwrap_or_default(),
                poetic_interpretation: raw_memory.poetic_interpretation.unwrap_or_default(),
                // Always the entry's own words; the model is not trusted to
                // quote verbatim.
                original_record: entry.content.clone(),
                feedback_line: raw_memory.feedback.unwrap_or_default(),
                background_media: entry.attachments.first().cloned(),
            })
        })
        .take(1)
        .collect();

    let tasks: Vec<TaskItem> = raw
        .tasks
        .into_iter()
        .filter_map(|task| {
            let content = task.content.filter(|c| !c.trim().is_empty())?;
            Some(TaskItem::new(content, task.is_completed))
        })
        .collect();

    let entry_count = entries.len();
    DailySummary {
        weather_line: raw
            .weather
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| "今日天气".to_string()),
        poetic_line: raw.poetic.unwrap_or_default(),
        summary_line: raw
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("今天记录了 {entry_count} 个瞬间。")),
        deep_memories,
        tasks,
    }
}
