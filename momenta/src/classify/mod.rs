mod engine;
mod llm;
mod rules;

pub use engine::ClassificationEngine;
pub use llm::LlmClassifier;
pub use rules::{predict_theme, RuleClassifier};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ClassificationResult, Thread};

/// Classification strategy: decide merge-or-new for one record against the
/// currently open threads, and derive its title, category, tags, mood and
/// decoration.
///
/// Two implementations exist — the remote model and the deterministic keyword
/// rules — and [`ClassificationEngine`] dispatches between them.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, content: &str, open_threads: &[Thread]) -> Result<ClassificationResult>;
}

/// Threads outside the recency window are never merge targets, regardless of
/// topical similarity.
pub(crate) fn in_window(thread: &Thread, now_ms: i64, window_ms: i64) -> bool {
    now_ms.saturating_sub(thread.last_updated_at) <= window_ms
}
