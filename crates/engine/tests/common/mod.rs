//! Shared fixtures for engine integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use corpus::{CorpusStore, Passage};
use embedding::Embedder;
use engine::{ConversationController, EngineConfig, ResponseComposer};
use memory_model::{HeuristicExtractor, MemoryModel};
use retrieval::RetrievalEngine;
use safety::SafetyGate;

/// Embedder that always returns the same unit vector; retrieval then ranks
/// purely by corpus vectors, which the fixtures choose explicitly.
pub struct FixedEmbedder;

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

pub fn passage(reference: &str, source: &str, topic: &str, embedding: Vec<f32>) -> Passage {
    Passage {
        text: format!("Wisdom on {} from {}.", topic.to_lowercase(), reference),
        reference: reference.to_string(),
        source: source.to_string(),
        chapter: None,
        verse: None,
        topic: topic.to_string(),
        language: "en".to_string(),
        embedding,
    }
}

pub fn test_corpus() -> Arc<CorpusStore> {
    Arc::new(CorpusStore::from_passages(vec![
        passage("Bhagavad Gita 2.47", "Bhagavad Gita", "Karma Yoga", vec![1.0, 0.0]),
        passage("Bhagavad Gita 6.34", "Bhagavad Gita", "Mind Control", vec![0.9, 0.1]),
        passage("Ramayana 1.1", "Ramayana", "Duty", vec![0.8, 0.2]),
    ]))
}

/// Controller wired with the heuristic extractor, no generator, fixed
/// embedder and the default config: fully deterministic.
pub fn test_controller() -> ConversationController {
    ConversationController::new(
        MemoryModel::new(Arc::new(HeuristicExtractor::new())),
        ResponseComposer::without_generator(),
        Arc::new(RetrievalEngine::new(test_corpus())),
        Arc::new(FixedEmbedder),
        Arc::new(SafetyGate::new()),
        EngineConfig::default(),
    )
}
