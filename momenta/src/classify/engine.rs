use crate::classify::{Classify, LlmClassifier, RuleClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::llm::LlmProvider;
use crate::models::{ClassificationResult, Thread};

/// Two-variant classification dispatcher: try the remote model, catch into
/// the deterministic rules. The strategies share one contract ([`Classify`]);
/// no boolean flag threads through the call sites.
pub struct ClassificationEngine {
    primary: Option<Box<dyn Classify>>,
    fallback: Box<dyn Classify>,
}

impl ClassificationEngine {
    pub fn new(primary: Option<Box<dyn Classify>>, fallback: Box<dyn Classify>) -> Self {
        Self { primary, fallback }
    }

    /// Wire up from configuration: the remote strategy exists only when an
    /// LLM is configured and constructible; the rule strategy always exists.
    pub fn from_config(llm: &LlmProvider, config: &Config) -> Self {
        let merge_window_secs = config.classifier.merge_window_secs;
        let primary: Option<Box<dyn Classify>> = match (&config.llm, llm.is_available()) {
            (Some(llm_config), true) => Some(Box::new(LlmClassifier::new(
                llm.clone(),
                llm_config,
                merge_window_secs,
            ))),
            _ => None,
        };

        Self::new(primary, Box::new(RuleClassifier::new(merge_window_secs)))
    }

    pub async fn classify(
        &self,
        content: &str,
        open_threads: &[Thread],
    ) -> Result<ClassificationResult> {
        if let Some(primary) = &self.primary {
            match primary.classify(content, open_threads).await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    tracing::warn!(%error, "Remote classification failed, using rule classifier");
                }
            }
        }

        self.fallback.classify(content, open_threads).await
    }
}
