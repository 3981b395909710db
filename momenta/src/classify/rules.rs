//! Deterministic keyword classifier, the fallback for every remote failure.
//!
//! Theme via keyword sets with a life-overrides-work precedence, category and
//! title from an ordered cascade, tags from two disjoint dictionaries, mood
//! from an ordered cascade with per-theme defaults, and a stable content hash
//! for the decoration index. The merge rule here is intentionally coarser
//! than the remote model's entity/scenario test: first open thread with the
//! same category name wins.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;

use crate::classify::{in_window, Classify};
use crate::error::Result;
use crate::models::{
    cap_tags, Category, ClassificationResult, Mood, Theme, Thread, DECORATION_VARIANTS, MAX_TAGS,
};

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static keyword pattern"))
}

macro_rules! keyword_re {
    ($name:ident, $pattern:literal) => {
        fn $name() -> &'static Regex {
            static CELL: OnceLock<Regex> = OnceLock::new();
            re(&CELL, $pattern)
        }
    };
}

keyword_re!(
    work_re,
    "需求|方案|产品|运营|互联网|开会|汇报|进度|工作|设计|评审|上线|迭代|测试|ai|大模型|商业化|数据|接口|增长|用户|发布"
);
keyword_re!(life_override_re, "孩子|宝宝|带娃|亲子|幼儿|小朋友|女儿|儿子|家人|爸妈");
keyword_re!(life_quick_re, "周末|休息|阳光|旅行|剧|玩|吃|风景|孩子|宝宝|健身");

/// Zero-cost theme prediction for live input theming in the UI. Shares the
/// keyword sets of the full classifier but never calls out.
pub fn predict_theme(text: &str) -> Option<Theme> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    if life_override_re().is_match(&text) {
        return Some(Theme::Life);
    }
    if work_re().is_match(&text) {
        return Some(Theme::Work);
    }
    if life_quick_re().is_match(&text) {
        return Some(Theme::Life);
    }
    None
}

fn detect_theme(text: &str) -> Theme {
    // Family and childcare keywords force the life theme even when generic
    // work vocabulary is present: teaching your kid Python is life.
    if life_override_re().is_match(text) {
        Theme::Life
    } else if work_re().is_match(text) {
        Theme::Work
    } else {
        Theme::Life
    }
}

fn category_and_title(text: &str, theme: Theme) -> (&'static str, &'static str) {
    static WORK_CASCADE: OnceLock<Vec<(Regex, &str, &str)>> = OnceLock::new();
    static LIFE_CASCADE: OnceLock<Vec<(Regex, &str, &str)>> = OnceLock::new();

    let cascade = match theme {
        Theme::Work => WORK_CASCADE.get_or_init(|| {
            vec![
                (regex("开会|评审|汇报|对齐|讨论|同步"), "会议与沟通", "工作协同与会议"),
                (regex("需求|方案|设计|迭代|上线|产品|prd"), "产品与方案", "产品推进记录"),
                (regex("运营|增长|dau|留存|转化|活动"), "运营增长", "运营动作记录"),
            ]
        }),
        Theme::Life => LIFE_CASCADE.get_or_init(|| {
            vec![
                (regex("电影|剧|院线|看片|动漫|演出|听歌|concert"), "影视娱乐", "文化娱乐时刻"),
                (regex("孩子|宝宝|带娃|亲子|幼儿|小朋友|女儿|儿子"), "亲子时光", "与孩子在一起"),
                (regex("吃|面|奶茶|饭|美食|餐厅|喝|咖啡"), "饮食美食", "美味探索小记"),
                (regex("旅行|周末去|风景|爬山|海边|游玩|散步"), "休闲出游", "放松出游时刻"),
                (regex("运动|健身|跑步|骑行|游泳"), "运动健康", "活力运动记录"),
            ]
        }),
    };

    for (pattern, category, title) in cascade {
        if pattern.is_match(text) {
            return (*category, *title);
        }
    }
    match theme {
        Theme::Work => ("日常工作", "日常事务办理"),
        Theme::Life => ("生活杂记", "生活记录"),
    }
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static keyword pattern")
}

/// Extract up to [`MAX_TAGS`] topical tags from the dictionary matching the
/// theme. The two dictionaries are disjoint; a record only ever draws from
/// one of them.
fn extract_tags(text: &str, theme: Theme) -> Vec<String> {
    static WORK_TAGS: OnceLock<Vec<(Regex, &str)>> = OnceLock::new();
    static LIFE_TAGS: OnceLock<Vec<(Regex, &str)>> = OnceLock::new();

    let dictionary = match theme {
        Theme::Work => WORK_TAGS.get_or_init(|| {
            vec![
                (regex("商业化|变现|广告|营收|商务|客户|合同|报价"), "商业化"),
                (regex("ai|人工智能|大模型|gpt|gemini|助理|智能体|agent"), "AI 助理"),
                (regex("数据|连接|接口|api|数据源|pipeline|etl|集成"), "数据连接"),
                (regex("需求|prd|文档|功能点"), "需求"),
                (regex("方案|规划|设计|架构|路线图"), "方案设计"),
                (regex("上线|发布|灰度|发版|部署"), "发布上线"),
                (regex("评审|对齐|开会|汇报|讨论|同步"), "沟通协作"),
                (regex("运营|增长|dau|留存|转化|活动"), "运营增长"),
                (regex("bug|测试|qa|验证|修复"), "质量保障"),
                (regex("用户|反馈|调研|访谈|nps"), "用户洞察"),
            ]
        }),
        Theme::Life => LIFE_TAGS.get_or_init(|| {
            vec![
                (regex("孩子|宝宝|带娃|亲子|陪伴|学校|幼儿|小朋友"), "亲子时光"),
                (regex("电影|剧|看片|动漫|演出|concert|综艺"), "影视娱乐"),
                (regex("吃|美食|餐厅|面|奶茶|咖啡|烧烤|火锅|甜品"), "美食探店"),
                (regex("旅行|出游|景区|民宿|机票|酒店"), "旅行出游"),
                (regex("运动|健身|跑步|骑行|游泳|球|锻炼"), "运动健康"),
                (regex("读书|书|阅读|学习|课程|笔记"), "阅读学习"),
                (regex("朋友|聚会|闺蜜|约|撸串|喝酒"), "社交聚会"),
                (regex("周末|假期|放假|休息|养精蓄锐"), "休闲放松"),
            ]
        }),
    };

    let mut tags = Vec::with_capacity(MAX_TAGS);
    for (pattern, tag) in dictionary {
        if pattern.is_match(text) {
            tags.push((*tag).to_string());
        }
    }
    cap_tags(tags)
}

/// Ordered mood cascade; first match wins, with a per-theme default.
fn detect_mood(text: &str, theme: Theme) -> Mood {
    static MOODS: OnceLock<Vec<(Regex, Mood)>> = OnceLock::new();

    let cascade = MOODS.get_or_init(|| {
        vec![
            (regex("疲惫|累|困|加班|熬夜|崩溃|焦虑|压力|好难|太难"), Mood::Tired),
            (regex("兴奋|太棒了|awesome|赞|惊喜|期待|发现|厉害|wow|牛|！！"), Mood::Excited),
            (regex("开心|快乐|哈哈|哈|😄|😊|🎉|好玩|好笑|搞笑|有趣"), Mood::Happy),
            (regex("旅行|出游|探索|冒险|骑行|爬山|攀登|户外|海边|远足"), Mood::Adventurous),
            (regex("孩子|宝宝|带娃|陪玩|玩游戏|躺平|摸鱼|懒|休息|睡"), Mood::Cozy),
            (regex("思考|想了很久|为什么|怎么|原来|学到|理解|领悟|好奇"), Mood::Curious),
            (regex("完成|收工|搞定|成功|上线|发布|达成|自豪|厉害|💪"), Mood::Proud),
            (regex("专注|在做|进行中|埋头|研究|攻克|盯着"), Mood::Focused),
            (regex("咖啡|下午茶|散步|惬意|舒服|享受|放松|慢|慵懒|静"), Mood::Calm),
            (regex("小朋友|玩|整活|有趣|逗|搞|玩梗|哈哈哈"), Mood::Playful),
        ]
    });

    for (pattern, mood) in cascade {
        if pattern.is_match(text) {
            return *mood;
        }
    }
    Mood::default_for(theme)
}

/// Stable decoration index in `[0, 50)` from the category name plus the first
/// 30 characters of the content. Identical-looking records keep a consistent
/// decoration across calls.
pub fn decoration_variant(content: &str, category_name: &str) -> u8 {
    let mut hash: u32 = 0;
    for c in category_name.chars().chain(content.chars().take(30)) {
        hash = hash.wrapping_mul(31).wrapping_add(c as u32);
    }
    (hash % DECORATION_VARIANTS) as u8
}

/// The deterministic classifier. Used whenever the remote model is
/// unreachable, times out, or returns unparsable output.
pub struct RuleClassifier {
    merge_window_ms: i64,
}

impl RuleClassifier {
    pub fn new(merge_window_secs: u64) -> Self {
        Self {
            merge_window_ms: (merge_window_secs as i64) * 1000,
        }
    }

    pub(crate) fn evaluate(
        &self,
        content: &str,
        open_threads: &[Thread],
        now_ms: i64,
    ) -> ClassificationResult {
        let text = content.trim().to_lowercase();

        let theme = detect_theme(&text);
        let (category_name, default_title) = category_and_title(&text, theme);
        let tags = extract_tags(&text, theme);
        let mood = detect_mood(&text, theme);
        let decoration = decoration_variant(&text, category_name);

        // Coarse merge rule: first recently-active thread in the same
        // category. Looser than the remote model's entity/scenario test on
        // purpose.
        let merge_target = open_threads.iter().find(|thread| {
            thread.category.name == category_name && in_window(thread, now_ms, self.merge_window_ms)
        });

        ClassificationResult {
            merge_target_id: merge_target.map(|t| t.id.clone()),
            title: merge_target
                .map(|t| t.title.clone())
                .unwrap_or_else(|| default_title.to_string()),
            category: Category {
                name: category_name.to_string(),
                theme,
            },
            tags,
            mood,
            decoration_variant: decoration,
        }
    }
}

#[async_trait]
impl Classify for RuleClassifier {
    async fn classify(&self, content: &str, open_threads: &[Thread]) -> Result<ClassificationResult> {
        Ok(self.evaluate(content, open_threads, Utc::now().timestamp_millis()))
    }
}
