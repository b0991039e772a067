//! Readiness scoring over accumulated signals.
//!
//! Readiness is a weighted sum of presence indicators, not a learned score:
//! the same memory always produces the same number. Weights favor knowing
//! what the concern is and how the person feels over demographic detail.

use crate::story::ConversationMemory;

/// Minimum concern length for the "concern clearly articulated" weight;
/// a few words is a topic, not a concern.
const CLEAR_CONCERN_LEN: usize = 30;

/// Quotes needed before the "rich context" weight applies.
const QUOTE_DEPTH: usize = 3;

/// Scores how ready the accumulated understanding is for guidance.
///
/// Weights: concern 0.2, emotion 0.15, trigger 0.15, duration 0.1, life area
/// 0.1, fears 0.1, needs 0.1, quote depth 0.1. Clamped to [0, 1].
pub fn score_readiness(memory: &ConversationMemory) -> f32 {
    let story = &memory.story;
    let mut score = 0.0_f32;

    if story.primary_concern.len() > CLEAR_CONCERN_LEN {
        score += 0.2;
    }
    if story.emotional_state.is_some() {
        score += 0.15;
    }
    if story.trigger_event.is_some() {
        score += 0.15;
    }
    if story.duration.is_some() {
        score += 0.1;
    }
    if story.life_area.is_some() {
        score += 0.1;
    }
    if !story.underlying_fears.is_empty() {
        score += 0.1;
    }
    if !story.unmet_needs.is_empty() {
        score += 0.1;
    }
    if memory.quotes.len() >= QUOTE_DEPTH {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Emotion, LifeArea};

    #[test]
    fn test_empty_memory_scores_zero() {
        assert_eq!(score_readiness(&ConversationMemory::default()), 0.0);
    }

    #[test]
    fn test_short_concern_does_not_count() {
        let mut memory = ConversationMemory::default();
        memory.story.primary_concern = "my job".to_string();
        assert_eq!(score_readiness(&memory), 0.0);
    }

    #[test]
    fn test_full_memory_caps_at_one() {
        let mut memory = ConversationMemory::default();
        memory.story.primary_concern =
            "I have been extremely anxious about my job for weeks now".to_string();
        memory.story.emotional_state = Some(Emotion::Anxiety);
        memory.story.trigger_event = Some("a new manager".to_string());
        memory.story.duration = Some("for weeks".to_string());
        memory.story.life_area = Some(LifeArea::Work);
        memory.story.underlying_fears = vec!["failure".to_string()];
        memory.story.unmet_needs = vec!["peace".to_string()];
        for turn in 1..=3 {
            memory.add_quote(turn, "a meaningful quote", 20);
        }

        let score = score_readiness(&memory);
        assert!(score <= 1.0);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_signals_sum() {
        let mut memory = ConversationMemory::default();
        memory.story.emotional_state = Some(Emotion::Sadness);
        memory.story.life_area = Some(LifeArea::Family);
        let score = score_readiness(&memory);
        assert!((score - 0.25).abs() < 1e-6);
    }
}
