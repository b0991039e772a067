//! The accumulated story and conversation memory.
//!
//! Merge rules are the heart of this module: a scalar story field is written
//! once and never overwritten or cleared, list fields union with dedup, and
//! quotes append under a cap. This is what lets understanding only grow over
//! a conversation.

use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::lexicon::{concepts_for_emotion, concepts_for_life_area, Emotion, Intensity, LifeArea};

/// The person's situation as understood so far. Built progressively; fields
/// move from empty to populated and stay.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Story {
    /// The main issue in the person's own framing.
    pub primary_concern: String,
    pub emotional_state: Option<Emotion>,
    pub life_area: Option<LifeArea>,
    /// What set the situation off, when mentioned.
    pub trigger_event: Option<String>,
    /// How long it has been going on, when mentioned.
    pub duration: Option<String>,
    /// What they seem afraid of underneath. Deduplicated.
    pub underlying_fears: Vec<String>,
    /// What they are seeking and not getting. Deduplicated.
    pub unmet_needs: Vec<String>,
    /// Demographic hints volunteered in conversation.
    pub profession: Option<String>,
    pub life_situation: Option<String>,
}

/// A significant quote in the person's own words, by turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserQuote {
    pub turn: u32,
    pub quote: String,
}

/// One point in the emotional arc of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionPoint {
    pub turn: u32,
    pub emotion: Emotion,
    pub intensity: Intensity,
}

/// Full memory for one conversation: the story plus readiness, quotes,
/// emotional arc and relevant concept tags. Owned by exactly one session and
/// mutated only through the memory model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    pub story: Story,
    /// How ready the accumulated understanding is for guidance, in [0, 1].
    pub readiness_for_wisdom: f32,
    pub quotes: Vec<UserQuote>,
    pub emotional_arc: Vec<EmotionPoint>,
    /// Concept tags relevant to the story, used to boost retrieval.
    pub relevant_concepts: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if !list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        list.push(value.to_string());
    }
}

impl ConversationMemory {
    /// Records a concept tag if not already present.
    pub fn add_concept(&mut self, concept: &str) {
        push_unique(&mut self.relevant_concepts, concept);
    }

    /// Records a significant quote, dropping the oldest past `cap`.
    pub fn add_quote(&mut self, turn: u32, quote: &str, cap: usize) {
        let quote = quote.trim();
        if quote.is_empty() {
            return;
        }
        self.quotes.push(UserQuote {
            turn,
            quote: quote.to_string(),
        });
        if self.quotes.len() > cap {
            let excess = self.quotes.len() - cap;
            self.quotes.drain(..excess);
        }
    }

    /// Records a point in the emotional arc.
    pub fn record_emotion(&mut self, turn: u32, emotion: Emotion, intensity: Intensity) {
        self.emotional_arc.push(EmotionPoint {
            turn,
            emotion,
            intensity,
        });
    }

    /// Intensity of the most recent arc entry, if any.
    pub fn latest_intensity(&self) -> Option<Intensity> {
        self.emotional_arc.last().map(|p| p.intensity)
    }

    /// Merges one turn's extracted signals into the memory.
    ///
    /// Does not touch `readiness_for_wisdom`; callers rescore after merging.
    pub fn absorb(&mut self, analysis: &Analysis, turn: u32, quote_cap: usize) {
        if self.story.primary_concern.is_empty() {
            if let Some(concern) = analysis.primary_concern.as_deref() {
                let concern = concern.trim();
                if !concern.is_empty() {
                    self.story.primary_concern = concern.to_string();
                }
            }
        }

        if let Some(emotion) = analysis.emotional_state {
            if self.story.emotional_state.is_none() {
                self.story.emotional_state = Some(emotion);
            }
            for concept in concepts_for_emotion(emotion) {
                self.add_concept(concept);
            }
            self.record_emotion(turn, emotion, analysis.emotional_intensity.unwrap_or_default());
        }

        if let Some(area) = analysis.life_area {
            if self.story.life_area.is_none() {
                self.story.life_area = Some(area);
            }
            for concept in concepts_for_life_area(area) {
                self.add_concept(concept);
            }
        }

        let story = &mut self.story;
        if story.trigger_event.is_none() {
            story.trigger_event = analysis
                .trigger_event
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
        }
        if story.duration.is_none() {
            story.duration = analysis
                .duration
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
        }
        if story.profession.is_none() {
            story.profession = analysis
                .profession
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
        }
        if story.life_situation.is_none() {
            story.life_situation = analysis
                .life_situation
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
        }

        for fear in &analysis.underlying_fears {
            push_unique(&mut self.story.underlying_fears, fear);
        }
        for need in &analysis.unmet_needs {
            push_unique(&mut self.story.unmet_needs, need);
        }

        if let Some(quote) = analysis.significant_quote.as_deref() {
            self.add_quote(turn, quote, quote_cap);
        }
    }

    /// One-line summary of what is known, for generator prompts and logs.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        let story = &self.story;

        if !story.primary_concern.is_empty() {
            let concern: String = story.primary_concern.chars().take(100).collect();
            parts.push(format!("Concern: {}", concern));
        }
        if let Some(emotion) = story.emotional_state {
            parts.push(format!("Feeling: {}", emotion.as_str()));
        }
        if let Some(area) = story.life_area {
            parts.push(format!("Area: {}", area.as_str()));
        }
        if let Some(trigger) = &story.trigger_event {
            parts.push(format!("Trigger: {}", trigger));
        }
        if let Some(duration) = &story.duration {
            parts.push(format!("Duration: {}", duration));
        }
        if !story.unmet_needs.is_empty() {
            parts.push(format!("Needs: {}", story.unmet_needs.join(", ")));
        }
        if !story.underlying_fears.is_empty() {
            parts.push(format!("Fears: {}", story.underlying_fears.join(", ")));
        }
        if let Some(last) = self.quotes.last() {
            let quote: String = last.quote.chars().take(80).collect();
            parts.push(format!("Recent: \"{}\"", quote));
        }

        parts.join(" | ")
    }
}
