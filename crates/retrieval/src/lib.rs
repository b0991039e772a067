//! # Retrieval Engine
//!
//! Brute-force nearest-neighbor search over the passage corpus by cosine
//! similarity. The corpus is small and static, so a full scan beats index
//! maintenance; retrieval is pure CPU work with no side effects and is safe
//! to run from any worker.
//!
//! ## Ranking
//!
//! 1. Cosine similarity between the query vector and every corpus vector.
//! 2. A passage whose text or topic contains a boost concept gets its score
//!    multiplied by a fixed factor, once per passage.
//! 3. Candidates are ranked by boosted score; ties keep corpus order
//!    (stable sort), so results are fully deterministic.
//! 4. Over-fetches `OVERFETCH × top_k` candidates, then applies the source
//!    allow-list, language and minimum-score filters, then truncates to
//!    `top_k`.
//!
//! A zero-norm query scores every passage 0, which the minimum-score filter
//! then removes; an over-filtered search simply returns fewer than `top_k`
//! results.

use std::sync::Arc;

use corpus::{CorpusStore, Passage};
use tracing::debug;

/// Score multiplier for passages matching a boost concept.
const CONCEPT_BOOST: f32 = 1.2;

/// Candidate over-fetch factor applied before filtering.
const OVERFETCH: usize = 3;

/// Search parameters for one retrieval call.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Sources the caller will accept; `None` allows all.
    pub allowed_sources: Option<Vec<String>>,
    /// Concepts whose textual presence boosts a passage's score.
    pub boost_concepts: Vec<String>,
    /// Language filter applied to passages.
    pub language: String,
    /// Passages scoring below this are excluded even if fewer than
    /// `top_k` results remain.
    pub min_score: f32,
    pub top_k: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            allowed_sources: None,
            boost_concepts: Vec::new(),
            language: "en".to_string(),
            min_score: 0.0,
            top_k: 5,
        }
    }
}

/// A retrieved passage with its (possibly boosted) similarity score.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Cosine similarity between two vectors.
///
/// Zero-length, zero-norm, and dimension-mismatched inputs all score 0.0
/// rather than erroring; retrieval treats "can't compare" as "not similar".
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Nearest-neighbor search over a shared, read-only corpus.
pub struct RetrievalEngine {
    corpus: Arc<CorpusStore>,
}

impl RetrievalEngine {
    pub fn new(corpus: Arc<CorpusStore>) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    /// Searches the corpus for passages similar to `query`.
    pub fn search(&self, query: &[f32], request: &SearchRequest) -> Vec<ScoredPassage> {
        let boost_concepts: Vec<String> = request
            .boost_concepts
            .iter()
            .map(|c| c.to_lowercase())
            .collect();

        let mut scored: Vec<(usize, f32)> = self
            .corpus
            .iter()
            .enumerate()
            .map(|(index, passage)| {
                let mut score = cosine_similarity(query, &passage.embedding);
                if !boost_concepts.is_empty() && concept_matches(passage, &boost_concepts) {
                    score *= CONCEPT_BOOST;
                }
                (index, score)
            })
            .collect();

        // Stable: equal scores keep corpus order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let candidates = request.top_k.saturating_mul(OVERFETCH);
        let results: Vec<ScoredPassage> = scored
            .into_iter()
            .take(candidates)
            .filter(|(_, score)| *score >= request.min_score)
            .filter_map(|(index, score)| {
                let passage = self.corpus.get(index)?;
                if let Some(allowed) = &request.allowed_sources {
                    if !allowed.iter().any(|s| s == &passage.source) {
                        return None;
                    }
                }
                if passage.language != request.language {
                    return None;
                }
                Some(ScoredPassage {
                    passage: passage.clone(),
                    score,
                })
            })
            .take(request.top_k)
            .collect();

        debug!(
            results = results.len(),
            top_k = request.top_k,
            boosted = !request.boost_concepts.is_empty(),
            "retrieval done"
        );
        results
    }
}

fn concept_matches(passage: &Passage, boost_concepts: &[String]) -> bool {
    let text = passage.text.to_lowercase();
    let topic = passage.topic.to_lowercase();
    boost_concepts
        .iter()
        .any(|concept| text.contains(concept) || topic.contains(concept))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(reference: &str, source: &str, topic: &str, embedding: Vec<f32>) -> Passage {
        Passage {
            text: format!("passage text for {}", reference),
            reference: reference.to_string(),
            source: source.to_string(),
            chapter: None,
            verse: None,
            topic: topic.to_string(),
            language: "en".to_string(),
            embedding,
        }
    }

    fn engine(passages: Vec<Passage>) -> RetrievalEngine {
        RetrievalEngine::new(Arc::new(CorpusStore::from_passages(passages)))
    }

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_identical_vector_scores_one_and_ranks_first() {
        let engine = engine(vec![
            passage("A 1.1", "Alpha", "Calm", vec![0.2, 0.8]),
            passage("A 1.2", "Alpha", "Duty", vec![1.0, 0.0]),
            passage("A 1.3", "Alpha", "Hope", vec![0.6, 0.4]),
        ]);

        let results = engine.search(&[1.0, 0.0], &SearchRequest::default());
        assert_eq!(results[0].passage.reference, "A 1.2");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_query_returns_nothing_above_threshold() {
        let engine = engine(vec![passage("A 1.1", "Alpha", "Calm", vec![0.5, 0.5])]);
        let request = SearchRequest {
            min_score: 0.1,
            ..SearchRequest::default()
        };
        let results = engine.search(&[0.0, 0.0], &request);
        assert!(results.is_empty());
    }

    #[test]
    fn test_min_score_excludes_even_below_k() {
        let engine = engine(vec![
            passage("A 1.1", "Alpha", "Calm", vec![1.0, 0.0]),
            passage("A 1.2", "Alpha", "Duty", vec![0.0, 1.0]),
        ]);
        let request = SearchRequest {
            min_score: 0.9,
            top_k: 5,
            ..SearchRequest::default()
        };
        let results = engine.search(&[1.0, 0.0], &request);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].passage.reference, "A 1.1");
    }

    #[test]
    fn test_source_allow_list() {
        let engine = engine(vec![
            passage("A 1.1", "Alpha", "Calm", vec![1.0, 0.0]),
            passage("B 1.1", "Beta", "Calm", vec![0.9, 0.1]),
        ]);
        let request = SearchRequest {
            allowed_sources: Some(vec!["Beta".to_string()]),
            ..SearchRequest::default()
        };
        let results = engine.search(&[1.0, 0.0], &request);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].passage.source, "Beta");
    }

    #[test]
    fn test_language_filter() {
        let mut hi = passage("A 1.1", "Alpha", "Calm", vec![1.0, 0.0]);
        hi.language = "hi".to_string();
        let engine = engine(vec![hi, passage("A 1.2", "Alpha", "Calm", vec![0.9, 0.1])]);

        let results = engine.search(&[1.0, 0.0], &SearchRequest::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].passage.reference, "A 1.2");
    }

    #[test]
    fn test_concept_boost_reorders() {
        let engine = engine(vec![
            passage("A 1.1", "Alpha", "Calm", vec![0.9, 0.1]),
            passage("A 1.2", "Alpha", "Surrender", vec![0.85, 0.15]),
        ]);

        let plain = engine.search(&[1.0, 0.0], &SearchRequest::default());
        assert_eq!(plain[0].passage.reference, "A 1.1");

        let request = SearchRequest {
            boost_concepts: vec!["surrender".to_string()],
            ..SearchRequest::default()
        };
        let boosted = engine.search(&[1.0, 0.0], &request);
        assert_eq!(boosted[0].passage.reference, "A 1.2");
        assert!(boosted[0].score > plain[0].score);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let engine = engine(vec![
            passage("A 1.1", "Alpha", "Calm", vec![1.0, 0.0]),
            passage("A 1.2", "Alpha", "Calm", vec![1.0, 0.0]),
            passage("A 1.3", "Alpha", "Calm", vec![1.0, 0.0]),
        ]);
        let results = engine.search(&[1.0, 0.0], &SearchRequest::default());
        let refs: Vec<&str> = results.iter().map(|r| r.passage.reference.as_str()).collect();
        assert_eq!(refs, vec!["A 1.1", "A 1.2", "A 1.3"]);
    }

    #[test]
    fn test_empty_corpus_returns_empty() {
        let engine = engine(vec![]);
        assert!(engine.search(&[1.0, 0.0], &SearchRequest::default()).is_empty());
    }

    #[test]
    fn test_truncates_to_top_k() {
        let passages: Vec<Passage> = (0..10)
            .map(|i| passage(&format!("A 1.{}", i), "Alpha", "Calm", vec![1.0, i as f32 * 0.01]))
            .collect();
        let engine = engine(passages);
        let request = SearchRequest {
            top_k: 3,
            ..SearchRequest::default()
        };
        assert_eq!(engine.search(&[1.0, 0.0], &request).len(), 3);
    }
}
