//! # Memory Model
//!
//! Accumulates a structured understanding of a person's situation across
//! conversation turns and scores how ready that understanding is for
//! grounded guidance.
//!
//! ## Modules
//!
//! - [`lexicon`] - Emotion / life-area enumerations and static keyword and
//!   concept lookup tables
//! - [`story`] - The [`Story`] and [`ConversationMemory`] types with their
//!   merge rules
//! - [`readiness`] - Weighted readiness scoring over accumulated signals
//! - [`analysis`] - The per-turn [`Analysis`] signal bundle
//! - [`extractor`] - The [`Extractor`] trait with heuristic and
//!   generator-assisted implementations
//!
//! ## Merge rules
//!
//! Story scalars only ever move from empty to populated; list fields are
//! unioned with dedup; quotes are appended with a cap. Readiness is
//! recomputed after every merge and always stays in `[0, 1]`.

pub mod analysis;
pub mod extractor;
pub mod lexicon;
pub mod readiness;
pub mod story;

pub use analysis::Analysis;
pub use extractor::{Extractor, GeneratorExtractor, HeuristicExtractor};
pub use lexicon::{Emotion, Intensity, LifeArea};
pub use readiness::score_readiness;
pub use story::{ConversationMemory, EmotionPoint, Story, UserQuote};

use std::sync::Arc;
use tracing::warn;

/// Default cap on recorded significant quotes.
pub const QUOTE_CAP: usize = 20;

/// Applies one turn's message to a memory: extract signals, merge, rescore.
///
/// Extraction failures are absorbed here: the memory keeps its last known
/// readiness and the turn continues, as required at the turn boundary.
pub struct MemoryModel {
    extractor: Arc<dyn Extractor>,
    quote_cap: usize,
}

impl MemoryModel {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            quote_cap: QUOTE_CAP,
        }
    }

    pub fn with_quote_cap(mut self, quote_cap: usize) -> Self {
        self.quote_cap = quote_cap;
        self
    }

    /// Extracts signals from `message` and merges them into `memory`.
    pub async fn update(&self, memory: &mut ConversationMemory, turn: u32, message: &str) {
        match self.extractor.extract(memory, turn, message).await {
            Ok(analysis) => {
                memory.absorb(&analysis, turn, self.quote_cap);
                memory.readiness_for_wisdom = score_readiness(memory);
            }
            Err(e) => {
                warn!(turn, error = %e, "signal extraction failed, keeping last readiness");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingExtractor;

    #[async_trait::async_trait]
    impl Extractor for FailingExtractor {
        async fn extract(
            &self,
            _memory: &ConversationMemory,
            _turn: u32,
            _message: &str,
        ) -> Result<Analysis, anyhow::Error> {
            anyhow::bail!("upstream exploded")
        }
    }

    #[tokio::test]
    async fn test_update_failure_keeps_readiness() {
        let model = MemoryModel::new(Arc::new(FailingExtractor));
        let mut memory = ConversationMemory::default();
        memory.readiness_for_wisdom = 0.55;

        model.update(&mut memory, 3, "I feel anxious").await;

        assert_eq!(memory.readiness_for_wisdom, 0.55);
    }

    #[tokio::test]
    async fn test_update_heuristic_readiness_in_bounds() {
        let model = MemoryModel::new(Arc::new(HeuristicExtractor::new()));
        let mut memory = ConversationMemory::default();

        for turn in 1..=6 {
            model
                .update(
                    &mut memory,
                    turn,
                    "I've been so anxious about my job for weeks because my manager keeps \
                     piling on work and I need some peace",
                )
                .await;
            assert!(memory.readiness_for_wisdom >= 0.0);
            assert!(memory.readiness_for_wisdom <= 1.0);
        }
    }
}
