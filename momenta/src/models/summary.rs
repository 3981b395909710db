use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MediaRef;

/// One highlighted moment inside a daily digest. At most one per digest; the
/// source entry id is validated against today's corpus before it is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepMemory {
    pub source_entry_id: String,
    /// Display clock time, `HH:MM`.
    pub time: String,
    pub core_summary: String,
    pub poetic_interpretation: String,
    pub original_record: String,
    pub feedback_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_media: Option<MediaRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub content: String,
    pub is_completed: bool,
}

impl TaskItem {
    pub fn new(content: impl Into<String>, is_completed: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            is_completed,
        }
    }
}

/// Structured end-of-day digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub weather_line: String,
    pub poetic_line: String,
    pub summary_line: String,
    pub deep_memories: Vec<DeepMemory>,
    pub tasks: Vec<TaskItem>,
}

impl DailySummary {
    /// Deterministic digest used when the remote model is unreachable or the
    /// day has no records yet. The UI must never block on this subsystem.
    pub fn fallback(entry_count: usize) -> Self {
        let summary_line = if entry_count == 0 {
            "今天还没有记录，随手写下第一个瞬间吧。".to_string()
        } else {
            format!("今天记录了 {entry_count} 个瞬间。")
        };
        Self {
            weather_line: "今日天气".to_string(),
            poetic_line: "记忆还在路上，先把此刻收好。".to_string(),
            summary_line,
            deep_memories: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_empty_handed_but_present() {
        let digest = DailySummary::fallback(0);
        assert!(digest.deep_memories.is_empty());
        assert!(digest.tasks.is_empty());
        assert!(!digest.weather_line.is_empty());
        assert!(!digest.poetic_line.is_empty());
    }

    #[test]
    fn fallback_counts_entries() {
        let digest = DailySummary::fallback(3);
        assert!(digest.summary_line.contains('3'));
    }
}
