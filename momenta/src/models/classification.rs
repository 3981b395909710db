use serde::{Deserialize, Serialize};

use super::{Category, Mood};

/// Transient output of the thread classifier; consumed immediately to build
/// or update a thread, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Validated against the in-window candidate set; hallucinated ids are
    /// discarded upstream, so `Some` always refers to a live thread.
    pub merge_target_id: Option<String>,
    pub title: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub mood: Mood,
    pub decoration_variant: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Search,
    Record,
}

/// Transient routing decision for one input string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Retrieval phrase extracted from a search input; never introduces
    /// entities absent from the input.
    pub rewritten_query: Option<String>,
}

impl IntentResult {
    pub fn record() -> Self {
        Self {
            intent: Intent::Record,
            rewritten_query: None,
        }
    }

    pub fn search(rewritten_query: Option<String>) -> Self {
        Self {
            intent: Intent::Search,
            rewritten_query,
        }
    }
}
