//! Prompt templates for the engine's four remote calls.
//!
//! Templates use `format!()` interpolation for type safety. Instructions are
//! bilingual on purpose: the decision rules are spelled out in English, the
//! few-shot examples stay in Chinese because that is what the journal's users
//! actually write.

/// Prompt for routing one input string to `record` or `search`.
///
/// The decision rule is deliberately biased toward `record`: a diary app must
/// not mistake a stated fact for a query. `search` requires an explicit
/// retrospective marker.
pub fn intent_prompt(input: &str) -> String {
    format!(
        r#"You are the intent router of a personal journal app. Classify the user input as "record" or "search".

Decision rule:
1. record (default): diary inputs state facts — a concrete action plus its object, a finished task, a current feeling — even without tense markers like "已" or "了".
   Example: "数据源付费墙豁免问题给出方案快速解决大客户问题" -> record (the user is logging a solution)
2. search: ONLY when the input explicitly looks back or asks — it contains a question mark, an interrogative word (如何/什么/哪里/为什么/什么时候), or an explicit retrieval verb (查找/查下/搜下/回顾/汇总).
   Example: "上次付费墙的方案是怎么定的？" -> search

When intent is "search", also return "query": the core entity/topic to retrieve, stripped of question scaffolding. The query may only use entities present in the input — never invent new ones.

Input: "{input}"

Return JSON only:
{{"intent": "record" | "search", "query": "retrieval phrase or null"}}"#
    )
}

/// Prompt for classifying one record against the in-window candidate threads.
///
/// Candidates arrive as `(id, title, category_name)` triples; only these ids
/// are legal merge targets.
pub fn classification_prompt(content: &str, candidates: &[(&str, &str, &str)]) -> String {
    let candidate_list = if candidates.is_empty() {
        "（暂无）".to_string()
    } else {
        candidates
            .iter()
            .map(|(id, title, category)| {
                format!(r#"{{"id": "{id}", "title": "{title}", "category": "{category}"}}"#)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are the moment-analysis assistant of a personal journal. Analyze one user record and return a strict JSON object.

### Step 1 — grade the input (internal)
- Grade A (core fact): a concrete action, object or outcome. e.g. "解决XX问题", "完成XX部署".
- Grade B (musing): feelings, small daily events, wishes. e.g. "今天好累", "想去旅行".
- Grade C (noise): extremely short, symbols, gibberish or test strings. e.g. "...", "123".

### Step 2 — extraction rules (strict)
1. Grade A title formula: [core entity + state], at most 10 characters. Strip filler words such as 问题 / 解决 / 任务 / 进行 / 完成.
   "数据源付费墙豁免问题已解决" -> "付费墙豁免"
   "完成商业化弹窗验收" -> "弹窗验收"
2. Grade B title: a short concrete phrase that keeps the feeling.
3. Grade C: title "瞬时闪念", tags ["碎片"], decoration_variant 0.

### Step 3 — fields
- category.name: at most 6 characters (业务研发 / 业务验收 / 亲子时光 / 生活杂记 …).
- category.theme: "work" or "life". Decide by WHO BENEFITS from the action — employer output is work, yourself or family is life — never by surface technical vocabulary. Teaching your kid Python is life.
- tags: at most 5. For work records the labels 商业化, 数据连接 and AI 助理 are mutually exclusive — include at most ONE of them per record.
- mood: one of happy, excited, proud, playful, curious, focused, calm, cozy, tired, adventurous.
- decoration_variant (0-49), pick by meaning:
  * shipped outcome / achievement / acceptance: 22 (rocket), 2 (crown), 44 (lightning)
  * deep work / study / thinking: 28 (headphones), 29 (monocle), 27 (scholar glasses), 32 (tie), 38 (book)
  * food & drink: 36 (coffee), 37 (cake), 4 (chef hat)
  * entertainment / celebration / art: 47 (note), 40 (confetti), 26 (sunglasses), 16 (rainbow)
  * travel / outdoors / weather: 21 (plane), 34 (backpack), 5 (cap), 17 (cloud), 42 (rain), 43 (snow)
  * everyday cute / mood: 11 (duckling), 12 (cat ears), 13 (bunny ears), 41 (heart), 35 (necklace)
  Use 0 ONLY for Grade C noise.
- merge_target_id: an id from the candidates below, or null. Merge ONLY when BOTH hold:
  1. Entity continuity — the record is about the same concrete subject, not merely a shared domain keyword. 付费墙 and 评价数据 both mentioning "数据源" must NOT merge.
  2. Scenario continuity — the record is progress on the SAME task, not a new task in the same category.
  When in doubt, return null.

### Few-shot
- "数据源付费墙豁免问题已解决" -> {{"category": {{"name": "业务研发", "theme": "work"}}, "title": "付费墙豁免", "tags": ["付费墙", "数据源"], "mood": "proud", "decoration_variant": 22, "merge_target_id": null}}
- "这周感觉好累，想去海边散散心" -> {{"category": {{"name": "琐碎生活", "theme": "life"}}, "title": "想去海边", "tags": ["散心", "减压"], "mood": "tired", "decoration_variant": 17, "merge_target_id": null}}
- "...测试123" -> {{"category": {{"name": "碎片", "theme": "life"}}, "title": "瞬时闪念", "tags": ["碎片"], "mood": "calm", "decoration_variant": 0, "merge_target_id": null}}

Candidate threads (recently active; may be empty):
{candidate_list}

User record:
"{content}"

Return JSON only, no markdown fences:
{{"category": {{"name": "...", "theme": "work|life"}}, "title": "...", "tags": ["..."], "mood": "...", "decoration_variant": 22, "merge_target_id": "id or null"}}"#
    )
}

/// Prompt for the precision re-validation stage of semantic search.
///
/// Receives the ORIGINAL user query, not the rewritten retrieval phrase, so
/// the reviewer judges against what the user actually asked.
pub fn revalidation_prompt(query: &str, candidates: &[(String, String)]) -> String {
    let candidate_list = candidates
        .iter()
        .enumerate()
        .map(|(index, (title, body))| format!("[{index}] {title}\n{body}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a strict reviewer of semantic search results for a personal journal.

User query: "{query}"

Candidate memories:
{candidate_list}

Return only the indices of candidates that are DIRECTLY and explicitly about the query topic. Exclude:
(a) candidates where the query term appears only as incidental background to a different primary activity;
(b) candidates too terse to confirm relevance.
Prefer leaving a candidate out over including an irrelevant one — a missed memory is cheaper than a wrong one.

Return JSON only:
{{"relevant_indices": [0, 2]}}"#
    )
}

/// Prompt for the end-of-day digest.
///
/// `event_lines` is a compact plain-text serialization, one entry per line
/// (`id | HH:MM | content | media:url`); plain lines keep the prompt small.
pub fn daily_summary_prompt(date_label: &str, event_lines: &str) -> String {
    format!(
        r#"You are the end-of-day narrator of a personal journal. Today is {date_label}.

Today's records, one per line (id | time | text | optional media):
{event_lines}

Return JSON only with these fields:
- "weather": a short weather/mood line for the day, at most 12 characters, in Chinese.
- "poetic": one short poetic sentence about the day.
- "summary": one factual sentence summarizing what was recorded today.
- "deep_memories": at most ONE highlight, as [{{"entry_id": "...", "time": "HH:MM", "core_summary": "...", "poetic_interpretation": "...", "original_record": "...", "feedback": "..."}}]. entry_id MUST be the id of a record listed above — NEVER invent one. Use [] when no record deserves a highlight.
- "tasks": to-do items inferred from planned or unfinished language in the records, as [{{"content": "...", "is_completed": false}}]. Mark is_completed true only for explicitly finished items worth listing.

Write the prose fields in Chinese. Return JSON only, no markdown fences."#
    )
}
