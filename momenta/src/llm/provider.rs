use std::sync::Arc;

use serde_json::Value;

use crate::config::{parse_provider_model, LlmConfig};
use crate::error::{MomentaError, Result};
use crate::llm::api::LlmApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    OpenRouter,
    SiliconFlow,
    DashScope,
    Ollama,
    LmStudio,
    OpenAiCompatible { base_url: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Handle on the configured chat-completion backend.
///
/// Construction never fails: a missing or broken configuration yields an
/// `Unavailable` provider, and every dependent component reads
/// [`LlmProvider::is_available`] to pick its degraded path instead of
/// erroring at the caller.
#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    client: Option<LlmApiClient>,
    config: Option<Arc<LlmConfig>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_provider_model(&config.model);
        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAi,
            "openrouter" => LlmBackend::OpenRouter,
            "siliconflow" => LlmBackend::SiliconFlow,
            "dashscope" => LlmBackend::DashScope,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAiCompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    return Self::unavailable(&format!(
                        "Unknown provider in model: {}",
                        config.model
                    ));
                }
            }
        };

        match LlmApiClient::new(config) {
            Ok(client) => Self {
                backend,
                client: Some(client),
                config: Some(Arc::new(config.clone())),
            },
            Err(error) => {
                tracing::warn!(%error, "LLM client construction failed; provider unavailable");
                Self::unavailable(&error.to_string())
            }
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            client: None,
            config: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        let client = self.require_client()?;
        client.complete(prompt, system_prompt, options).await
    }

    pub async fn complete_json(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<Value> {
        let client = self.require_client()?;
        client.complete_json(prompt, system_prompt, options).await
    }

    fn require_client(&self) -> Result<&LlmApiClient> {
        self.client.as_ref().ok_or_else(|| {
            MomentaError::LlmUnavailable(match &self.backend {
                LlmBackend::Unavailable { reason } => reason.clone(),
                _ => "LLM client not constructed".to_string(),
            })
        })
    }
}
