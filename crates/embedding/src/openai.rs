//! OpenAI-compatible embedder.
//!
//! Works against the OpenAI embeddings API or any compatible endpoint via a
//! custom base URL. Each request carries its own timeout so a stalled
//! connection cannot hold a conversation turn open.

use async_openai::{types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::Embedder;

/// Per-request timeout (connect + request + response).
const EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedder backed by an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedder {
    client: Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIEmbedder {
    /// Creates an embedder for the default OpenAI endpoint.
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, None)
    }

    /// Creates an embedder with an optional custom base URL for compatible
    /// endpoints.
    pub fn with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let mut config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url.filter(|s| !s.is_empty()) {
            config = config.with_api_base(url);
        }
        Self {
            client: Client::with_config(config),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(inputs)
            .build()?;

        let embeddings = self.client.embeddings();
        let call = embeddings.create(request);
        let response = match tokio::time::timeout(EMBED_TIMEOUT, call).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => {
                warn!(error = %e, model = %self.model, "embed request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    timeout_secs = EMBED_TIMEOUT.as_secs(),
                    model = %self.model,
                    "embed request timed out"
                );
                anyhow::bail!(
                    "embed request timed out after {} seconds",
                    EMBED_TIMEOUT.as_secs()
                );
            }
        };

        debug!(vectors = response.data.len(), "embed response received");
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let mut vectors = self.request(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embed response contained no embedding data"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.request(texts.to_vec()).await?;
        if vectors.len() != texts.len() {
            anyhow::bail!(
                "embed response count mismatch: got {}, expected {}",
                vectors.len(),
                texts.len()
            );
        }
        Ok(vectors)
    }
}
