//! # Text Embeddings
//!
//! This crate defines the embedder interface used to turn query text into
//! vectors for corpus retrieval, plus two implementations:
//!
//! - [`OpenAIEmbedder`]: OpenAI-compatible embeddings API (also works with
//!   compatible endpoints via a custom base URL).
//! - [`NullEmbedder`]: returns zero vectors of a fixed dimension. Retrieval
//!   treats a zero-norm query as "no similarity", so a deployment without an
//!   embedding service degrades to template-only behavior instead of failing.
//!
//! The embedder is assumed deterministic for a fixed model version; callers
//! must still guard every call, since it crosses a network boundary.

use async_trait::async_trait;

mod config;
mod openai;

pub use config::EnvEmbeddingConfig;
pub use openai::OpenAIEmbedder;

/// Service for generating text embeddings.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts in a single call.
    /// More efficient than calling `embed` in a loop.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;
}

/// Embedder that produces zero vectors of a fixed dimension.
///
/// Stands in when no embedding service is configured; downstream retrieval
/// scores every passage 0 for a zero-norm query and returns nothing.
#[derive(Debug, Clone)]
pub struct NullEmbedder {
    dimension: usize,
}

impl NullEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for NullEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        Ok(vec![0.0; self.dimension])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        Ok(texts.iter().map(|_| vec![0.0; self.dimension]).collect())
    }
}
