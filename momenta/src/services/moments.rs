use std::sync::Arc;

use chrono::{Datelike, Local, Utc};
use futures::future::join_all;

use crate::classify::ClassificationEngine;
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::intent::IntentRouter;
use crate::llm::LlmProvider;
use crate::models::{ClassificationResult, DailySummary, Entry, Intent, MediaRef, Thread};
use crate::search::{SearchHit, SearchPipeline};
use crate::services::{MediaFile, MediaStore, ThreadStore};
use crate::summary::DailySummarizer;

/// What one handled input produced.
#[derive(Debug)]
pub enum Outcome {
    /// The input was recorded; the full updated collection has been saved.
    Recorded {
        threads: Vec<Thread>,
        highlight_thread_id: String,
    },
    /// The input was a retrieval query; nothing was written.
    Found { hits: Vec<SearchHit> },
}

/// Front door of the engine: routes an input, then runs either the record
/// path (uploads → classification → copy-on-write commit) or the search path
/// (embed → two-stage pipeline).
///
/// The service holds no mutable state of its own; every cycle reads a store
/// snapshot and produces a new collection, so concurrent submissions never
/// contend on shared threads.
pub struct MomentService {
    router: IntentRouter,
    engine: ClassificationEngine,
    embeddings: EmbeddingProvider,
    pipeline: SearchPipeline,
    summarizer: DailySummarizer,
    threads: Arc<dyn ThreadStore>,
    media: Arc<dyn MediaStore>,
    search_threshold: f32,
    search_max_results: usize,
}

impl MomentService {
    pub fn new(config: &Config, threads: Arc<dyn ThreadStore>, media: Arc<dyn MediaStore>) -> Self {
        let llm = LlmProvider::new(config.llm.as_ref());
        Self {
            router: IntentRouter::new(llm.clone(), config.llm.as_ref()),
            engine: ClassificationEngine::from_config(&llm, config),
            embeddings: EmbeddingProvider::new(config.embeddings.as_ref()),
            pipeline: SearchPipeline::new(llm.clone(), config.llm.as_ref()),
            summarizer: DailySummarizer::new(llm, &config.summary),
            threads,
            media,
            search_threshold: config.search.threshold,
            search_max_results: config.search.max_results,
        }
    }

    pub async fn handle_input(&self, input: &str, uploads: Vec<MediaFile>) -> Result<Outcome> {
        let snapshot = self.threads.load().await?;
        let routed = self.router.route(input).await;

        match routed.intent {
            Intent::Search => {
                let retrieval_phrase = routed.rewritten_query.as_deref().unwrap_or(input);
                Ok(Outcome::Found {
                    hits: self.search(retrieval_phrase, input, &snapshot).await,
                })
            }
            Intent::Record => self.record(input, uploads, snapshot).await,
        }
    }

    /// Search path. The rewritten phrase drives recall; the original input
    /// drives re-validation, so the reviewer judges what the user actually
    /// typed.
    async fn search(
        &self,
        retrieval_phrase: &str,
        original_query: &str,
        snapshot: &[Thread],
    ) -> Vec<SearchHit> {
        let query_vector = self.embeddings.embed_or_empty(retrieval_phrase).await;
        self.pipeline
            .search(
                &query_vector,
                snapshot,
                original_query,
                self.search_threshold,
                self.search_max_results,
            )
            .await
    }

    async fn record(
        &self,
        content: &str,
        uploads: Vec<MediaFile>,
        snapshot: Vec<Thread>,
    ) -> Result<Outcome> {
        // All uploads must complete or fail before classification, since
        // attachment URLs are embedded in the entry.
        let attachments = self.upload_all(uploads).await;

        let classification = self.engine.classify(content, &snapshot).await?;
        let entry = Entry::new(content, Utc::now().timestamp_millis(), attachments.clone());

        let (mut updated, highlight_thread_id) = commit_classification(snapshot, classification, entry);

        if let Some(touched) = updated.iter_mut().find(|t| t.id == highlight_thread_id) {
            let vector = self.embeddings.embed_or_empty(&touched.joined_content()).await;
            touched.embedding = (!vector.is_empty()).then_some(vector);
        }

        updated.sort_by(|a, b| b.last_updated_at.cmp(&a.last_updated_at));

        if let Err(error) = self.threads.save(&updated).await {
            // The entry is lost; don't leave its blobs orphaned.
            self.discard_media(&attachments).await;
            return Err(error);
        }

        Ok(Outcome::Recorded {
            threads: updated,
            highlight_thread_id,
        })
    }

    /// Upload all pending files concurrently; a failed upload drops that
    /// attachment with a warning rather than failing the submission.
    async fn upload_all(&self, uploads: Vec<MediaFile>) -> Vec<MediaRef> {
        if uploads.is_empty() {
            return Vec::new();
        }

        let results = join_all(uploads.into_iter().map(|file| {
            let name = file.name.clone();
            async move { (name, self.media.upload(file).await) }
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(name, result)| match result {
                Ok(media_ref) => Some(media_ref),
                Err(error) => {
                    tracing::warn!(file = %name, %error, "Media upload failed, dropping attachment");
                    None
                }
            })
            .collect()
    }

    async fn discard_media(&self, attachments: &[MediaRef]) {
        for media_ref in attachments {
            if let Err(error) = self.media.delete(&media_ref.url).await {
                tracing::warn!(url = %media_ref.url, %error, "Best-effort media cleanup failed");
            }
        }
    }

    /// Digest of everything recorded today, cached per calendar date.
    pub async fn today_digest(&self, force_refresh: bool) -> Result<DailySummary> {
        let snapshot = self.threads.load().await?;
        let now = Local::now();
        let todays: Vec<Thread> = snapshot
            .into_iter()
            .filter(|thread| is_same_local_day(thread.last_updated_at, &now))
            .collect();

        let date_label = format!("{}年{:02}月{:02}日", now.year(), now.month(), now.day());
        Ok(self.summarizer.summarize(&todays, &date_label, force_refresh).await)
    }
}

fn is_same_local_day(timestamp_ms: i64, now: &chrono::DateTime<Local>) -> bool {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|utc| {
            let local = utc.with_timezone(&Local);
            local.year() == now.year() && local.ordinal() == now.ordinal()
        })
        .unwrap_or(false)
}

/// Apply one classification to a snapshot, copy-on-write: either the target
/// thread absorbs the entry or a fresh thread opens at the front. Returns the
/// new collection and the id of the touched thread.
pub fn commit_classification(
    snapshot: Vec<Thread>,
    classification: ClassificationResult,
    entry: Entry,
) -> (Vec<Thread>, String) {
    match classification.merge_target_id {
        Some(target_id) => {
            let threads: Vec<Thread> = snapshot
                .into_iter()
                .map(|thread| {
                    if thread.id == target_id {
                        thread.absorb(entry.clone(), &classification.tags, classification.mood)
                    } else {
                        thread
                    }
                })
                .collect();
            (threads, target_id)
        }
        None => {
            let thread = Thread::open(
                classification.title,
                classification.category,
                classification.tags,
                classification.mood,
                classification.decoration_variant,
                entry,
            );
            let id = thread.id.clone();
            let mut threads = Vec::with_capacity(snapshot.len() + 1);
            threads.push(thread);
            threads.extend(snapshot);
            (threads, id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Mood, Theme};

    fn classification(merge_target_id: Option<String>) -> ClassificationResult {
        ClassificationResult {
            merge_target_id,
            title: "付费墙豁免".to_string(),
            category: Category {
                name: "业务研发".to_string(),
                theme: Theme::Work,
            },
            tags: vec!["付费墙".to_string()],
            mood: Mood::Proud,
            decoration_variant: 22,
        }
    }

    #[test]
    fn no_merge_target_opens_a_new_thread_in_front() {
        let existing = Thread::open(
            "旧话题",
            Category {
                name: "生活杂记".to_string(),
                theme: Theme::Life,
            },
            Vec::new(),
            Mood::Calm,
            3,
            Entry::new("旧", 100, Vec::new()),
        );
        let snapshot = vec![existing.clone()];

        let (threads, highlight) =
            commit_classification(snapshot, classification(None), Entry::new("新", 200, Vec::new()));

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].id, highlight);
        assert_eq!(threads[0].title, "付费墙豁免");
        assert_eq!(threads[1].id, existing.id);
    }

    #[test]
    fn merge_target_absorbs_the_entry() {
        let existing = Thread::open(
            "付费墙豁免",
            Category {
                name: "业务研发".to_string(),
                theme: Theme::Work,
            },
            vec!["数据源".to_string()],
            Mood::Focused,
            22,
            Entry::new("旧", 100, Vec::new()),
        );
        let target_id = existing.id.clone();
        let snapshot = vec![existing];

        let (threads, highlight) = commit_classification(
            snapshot,
            classification(Some(target_id.clone())),
            Entry::new("新进展", 200, Vec::new()),
        );

        assert_eq!(threads.len(), 1);
        assert_eq!(highlight, target_id);
        assert_eq!(threads[0].entries.len(), 2);
        assert_eq!(threads[0].last_updated_at, 200);
        assert_eq!(threads[0].mood, Mood::Proud);
        assert_eq!(threads[0].tags, vec!["数据源", "付费墙"]);
    }
}
