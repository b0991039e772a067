//! # Passage Corpus
//!
//! This crate defines the corpus of quotable passages with precomputed
//! embedding vectors, loaded once at startup and never mutated afterwards.
//!
//! ## Passage
//!
//! A single quotable unit of source text. Each passage carries the source it
//! came from (e.g. "Bhagavad Gita"), a human-readable reference, a topic tag
//! used for concept boosting, a language code, and an embedding vector
//! produced offline by the ingestion pipeline.
//!
//! ## CorpusStore
//!
//! An immutable, index-stable collection of passages. Index stability matters:
//! retrieval breaks similarity ties by corpus order, so the order of the
//! loaded file is the order of the store.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "passages": [
//!     {
//!       "text": "...",
//!       "reference": "Bhagavad Gita 2.47",
//!       "source": "Bhagavad Gita",
//!       "chapter": 2,
//!       "verse": 47,
//!       "topic": "Karma Yoga",
//!       "language": "en",
//!       "embedding": [0.1, 0.2]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading a corpus file.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse corpus file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("passage {index} ({reference}) has embedding dimension {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        reference: String,
        got: usize,
        expected: usize,
    },

    #[error("passage {index} ({reference}) has no embedding")]
    MissingEmbedding { index: usize, reference: String },
}

/// An atomic quotable unit of source text with its precomputed vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// The passage text itself.
    pub text: String,
    /// Human-readable citation, e.g. "Bhagavad Gita 2.47".
    pub reference: String,
    /// Source work the passage belongs to.
    pub source: String,
    /// Chapter number within the source, when the source is chaptered.
    #[serde(default)]
    pub chapter: Option<u32>,
    /// Verse number within the chapter.
    #[serde(default)]
    pub verse: Option<u32>,
    /// Topic tag assigned at ingestion time, e.g. "Equanimity".
    pub topic: String,
    /// ISO language code of the text ("en", "hi", ...).
    #[serde(default = "default_language")]
    pub language: String,
    /// Embedding vector produced offline for this text.
    pub embedding: Vec<f32>,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
struct CorpusFile {
    passages: Vec<Passage>,
}

/// Immutable, in-memory passage collection with stable ordering.
#[derive(Debug)]
pub struct CorpusStore {
    passages: Vec<Passage>,
}

impl CorpusStore {
    /// Builds a store from already-validated passages. Order is preserved.
    pub fn from_passages(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    /// Loads a corpus from a JSON file and validates embedding dimensions.
    ///
    /// Every passage must carry a non-empty embedding of the same dimension
    /// as the first passage; mismatches abort the load so a half-ingested
    /// file never reaches retrieval.
    pub fn load_from_json(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let file: CorpusFile = serde_json::from_str(&raw)?;
        let store = Self::from_passages(file.passages);
        store.validate()?;
        info!(
            passages = store.len(),
            dimension = store.dimension().unwrap_or(0),
            "corpus loaded"
        );
        Ok(store)
    }

    fn validate(&self) -> Result<(), CorpusError> {
        let expected = match self.passages.first() {
            Some(p) => p.embedding.len(),
            None => return Ok(()),
        };
        for (index, p) in self.passages.iter().enumerate() {
            if p.embedding.is_empty() {
                return Err(CorpusError::MissingEmbedding {
                    index,
                    reference: p.reference.clone(),
                });
            }
            if p.embedding.len() != expected {
                return Err(CorpusError::DimensionMismatch {
                    index,
                    reference: p.reference.clone(),
                    got: p.embedding.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Embedding dimension of the corpus, or `None` when empty.
    pub fn dimension(&self) -> Option<usize> {
        self.passages.first().map(|p| p.embedding.len())
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Passage at corpus index, if in range.
    pub fn get(&self, index: usize) -> Option<&Passage> {
        self.passages.get(index)
    }

    /// Iterates passages in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = &Passage> {
        self.passages.iter()
    }
}
