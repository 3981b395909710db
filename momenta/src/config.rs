use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Split a `provider/model` string into its parts.
///
/// Strings without a slash are treated as bare model names on the default
/// provider (`openai`). A model string like `siliconflow/deepseek-ai/DeepSeek-V3`
/// splits at the first slash only, so nested model paths survive.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    match model.split_once('/') {
        Some((provider, rest)) => (provider, rest),
        None => ("openai", model),
    }
}

/// Top-level engine configuration, built once at process start and injected
/// into every component. There is no ambient global state; a missing section
/// means the corresponding remote path is disabled and the documented
/// degradation applies.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: Option<LlmConfig>,
    pub embeddings: Option<EmbeddingsConfig>,
    pub classifier: ClassifierConfig,
    pub search: SearchConfig,
    pub summary: SummaryConfig,
}

/// Chat-completion model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// `provider/model`, e.g. `siliconflow/deepseek-ai/DeepSeek-V3`.
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Budget for thread classification calls.
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Budget for intent routing; sits on the synchronous submission path.
    pub intent_timeout_secs: u64,
    /// Budget for search re-validation.
    pub revalidation_timeout_secs: u64,
}

/// Remote embedding model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Threads not updated within this window are never merge targets.
    pub merge_window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Minimum cosine similarity for coarse recall.
    pub threshold: f32,
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    /// Number of cached daily digests (one per calendar date).
    pub cache_size: usize,
    /// Largest remote budget in the engine; the digest prompt is the biggest.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 20),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 1),
                intent_timeout_secs: parse_env_or("INTENT_TIMEOUT", 15),
                revalidation_timeout_secs: parse_env_or("REVALIDATION_TIMEOUT", 15),
            }),
            embeddings: env::var("EMBEDDING_MODEL").ok().map(|model| EmbeddingsConfig {
                model,
                api_key: env::var("EMBEDDING_API_KEY")
                    .ok()
                    .or_else(|| env::var("LLM_API_KEY").ok()),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                dimensions: parse_env_or("EMBEDDING_DIMENSIONS", 1024),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 5),
            }),
            classifier: ClassifierConfig {
                merge_window_secs: parse_env_or("MERGE_WINDOW_SECS", 3600),
            },
            search: SearchConfig {
                threshold: parse_env_or("SEARCH_THRESHOLD", 0.5),
                max_results: parse_env_or("SEARCH_MAX_RESULTS", 10),
            },
            summary: SummaryConfig {
                cache_size: parse_env_or("SUMMARY_CACHE_SIZE", 32),
                timeout_secs: parse_env_or("SUMMARY_TIMEOUT", 40),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// `.env`-aware constructor for hosts that bootstrap from a dotfile.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}
