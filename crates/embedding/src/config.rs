//! Embedding configuration loaded from environment variables.

use anyhow::Result;
use std::env;

/// Embedding config loaded from environment variables.
///
/// `EMBEDDING_API_KEY` falls back to `OPENAI_API_KEY`; when neither is set the
/// assembly falls back to a [`NullEmbedder`](crate::NullEmbedder) of
/// `EMBEDDING_DIM` dimensions.
#[derive(Debug, Clone)]
pub struct EnvEmbeddingConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub dimension: usize,
}

impl EnvEmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("EMBEDDING_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .unwrap_or_default();
        let base_url = env::var("EMBEDDING_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let model = env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let dimension = env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1536);
        Ok(Self {
            api_key,
            base_url,
            model,
            dimension,
        })
    }

    /// True when an API key is present and the real embedder can be built.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_without_key() {
        let cfg = EnvEmbeddingConfig {
            api_key: String::new(),
            base_url: None,
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        };
        assert!(!cfg.is_configured());
    }
}
