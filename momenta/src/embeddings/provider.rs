use crate::config::EmbeddingsConfig;
use crate::embeddings::EmbeddingApiClient;
use crate::error::{MomentaError, Result};

enum EmbeddingBackend {
    Remote {
        client: EmbeddingApiClient,
        dimensions: usize,
    },
    Unavailable {
        reason: String,
    },
}

/// Handle on the configured embedding backend.
///
/// Like the LLM provider, construction never fails; without a configuration
/// the provider is `Unavailable` and no embedding call is ever attempted,
/// which in turn disables semantic search for the whole corpus.
pub struct EmbeddingProvider {
    backend: EmbeddingBackend,
}

impl EmbeddingProvider {
    pub fn new(config: Option<&EmbeddingsConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No embedding configuration provided");
        };

        match EmbeddingApiClient::new(config) {
            Ok(client) => Self {
                backend: EmbeddingBackend::Remote {
                    client,
                    dimensions: config.dimensions,
                },
            },
            Err(error) => {
                tracing::warn!(%error, "Embedding client construction failed; provider unavailable");
                Self::unavailable(&error.to_string())
            }
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: EmbeddingBackend::Unavailable {
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, EmbeddingBackend::Remote { .. })
    }

    pub fn dimensions(&self) -> Option<usize> {
        match &self.backend {
            EmbeddingBackend::Remote { dimensions, .. } => Some(*dimensions),
            EmbeddingBackend::Unavailable { .. } => None,
        }
    }

    /// Strict variant: embed one text or report why it could not be done.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match &self.backend {
            EmbeddingBackend::Unavailable { reason } => {
                Err(MomentaError::EmbeddingUnavailable(reason.clone()))
            }
            EmbeddingBackend::Remote { client, .. } => {
                let mut vectors = client.embed(&[text]).await?;
                vectors
                    .pop()
                    .ok_or_else(|| MomentaError::Embedding("No embedding returned".to_string()))
            }
        }
    }

    /// Lenient variant used on the submission path: the empty vector is a
    /// normal, handled state everywhere downstream, never a fatal error.
    pub async fn embed_or_empty(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self.embed(text).await {
            Ok(vector) => vector,
            Err(MomentaError::EmbeddingUnavailable(_)) => Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "Embedding failed; proceeding without a vector");
                Vec::new()
            }
        }
    }
}
