use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tags per thread are capped here; merging unions and re-caps.
pub const MAX_TAGS: usize = 5;

/// Decoration variants available to the UI; indices are 0..DECORATION_VARIANTS.
pub const DECORATION_VARIANTS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Pointer to an uploaded media object. Immutable once created; owned by the
/// entry that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub kind: MediaKind,
    pub name: String,
}

/// One atomic user submission. Never mutated after creation; appended to
/// exactly one thread's entry sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub content: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MediaRef>,
}

impl Entry {
    pub fn new(content: impl Into<String>, timestamp: i64, attachments: Vec<MediaRef>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            timestamp,
            attachments,
        }
    }
}

/// Coarse two-way classification used for UI theming and merge scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Work,
    Life,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub theme: Theme,
}

/// Emotional tone of a thread, assigned per entry by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Focused,
    Excited,
    Calm,
    Tired,
    Playful,
    Proud,
    Curious,
    Cozy,
    Adventurous,
}

impl Mood {
    /// No-signal default for each theme.
    pub fn default_for(theme: Theme) -> Self {
        match theme {
            Theme::Work => Mood::Focused,
            Theme::Life => Mood::Calm,
        }
    }
}

/// A clustered topic card aggregating one or more chronological entries.
///
/// Invariants: `entries` is non-empty and time-ordered; `tags` is deduplicated
/// and capped at [`MAX_TAGS`]; `last_updated_at` equals the newest entry's
/// timestamp; `embedding`, when present, was computed over the concatenation
/// of all entry contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub entries: Vec<Entry>,
    /// Unix milliseconds of the newest entry.
    pub last_updated_at: i64,
    pub mood: Mood,
    pub decoration_variant: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Thread {
    /// Open a new topic card around a first entry.
    pub fn open(
        title: impl Into<String>,
        category: Category,
        tags: Vec<String>,
        mood: Mood,
        decoration_variant: u8,
        entry: Entry,
    ) -> Self {
        let last_updated_at = entry.timestamp;
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            category,
            tags: cap_tags(tags),
            entries: vec![entry],
            last_updated_at,
            mood,
            decoration_variant,
            embedding: None,
        }
    }

    /// Produce the merged successor of this thread: entry appended, tags
    /// unioned and re-capped, mood refreshed, `last_updated_at` bumped.
    ///
    /// The embedding is cleared because it no longer covers the new entry;
    /// the caller recomputes it. The original thread is untouched (thread
    /// collections are copy-on-write).
    pub fn absorb(&self, entry: Entry, new_tags: &[String], mood: Mood) -> Thread {
        let mut merged = self.clone();
        merged.last_updated_at = entry.timestamp.max(merged.last_updated_at);
        merged.entries.push(entry);
        let mut tags = merged.tags;
        tags.extend(new_tags.iter().cloned());
        merged.tags = cap_tags(tags);
        merged.mood = mood;
        merged.embedding = None;
        merged
    }

    /// Concatenated entry contents, the text the thread embedding covers.
    pub fn joined_content(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// Deduplicate preserving first occurrence, then cap at [`MAX_TAGS`].
pub fn cap_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(MAX_TAGS);
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
            if seen.len() == MAX_TAGS {
                break;
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str, ts: i64) -> Entry {
        Entry::new(content, ts, Vec::new())
    }

    fn work_category() -> Category {
        Category {
            name: "业务研发".to_string(),
            theme: Theme::Work,
        }
    }

    #[test]
    fn open_sets_last_updated_from_entry() {
        let thread = Thread::open(
            "付费墙豁免",
            work_category(),
            vec!["数据源".to_string()],
            Mood::Proud,
            22,
            entry("数据源付费墙豁免问题已解决", 1_700_000_000_000),
        );
        assert_eq!(thread.last_updated_at, 1_700_000_000_000);
        assert_eq!(thread.entries.len(), 1);
        assert!(thread.embedding.is_none());
    }

    #[test]
    fn absorb_appends_and_bumps_timestamp() {
        let thread = Thread::open(
            "付费墙豁免",
            work_category(),
            vec!["付费墙".to_string()],
            Mood::Focused,
            22,
            entry("初版方案", 1_000),
        );
        let merged = thread.absorb(entry("边界 Case 补齐", 2_000), &["数据源".to_string()], Mood::Proud);

        assert_eq!(merged.entries.len(), 2);
        assert_eq!(merged.last_updated_at, 2_000);
        assert_eq!(merged.mood, Mood::Proud);
        assert!(merged.embedding.is_none());
        // original untouched
        assert_eq!(thread.entries.len(), 1);
    }

    #[test]
    fn absorb_unions_tags_with_cap() {
        let thread = Thread::open(
            "t",
            work_category(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            Mood::Focused,
            1,
            entry("x", 1),
        );
        let merged = thread.absorb(
            entry("y", 2),
            &["c".to_string(), "e".to_string(), "f".to_string()],
            Mood::Focused,
        );
        assert_eq!(merged.tags, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn cap_tags_dedupes_and_caps() {
        let tags = vec![
            "a".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
            "e".to_string(),
            "f".to_string(),
        ];
        let capped = cap_tags(tags);
        assert_eq!(capped.len(), MAX_TAGS);
        assert_eq!(capped, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn joined_content_concatenates_entries() {
        let thread = Thread::open("t", work_category(), Vec::new(), Mood::Focused, 1, entry("one", 1));
        let merged = thread.absorb(entry("two", 2), &[], Mood::Focused);
        assert_eq!(merged.joined_content(), "one\ntwo");
    }
}
