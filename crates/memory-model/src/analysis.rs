//! Per-turn signal bundle produced by an extractor.

use serde::{Deserialize, Serialize};

use crate::lexicon::{Emotion, Intensity, LifeArea};

/// Signals extracted from one user message. Every field is optional: a turn
/// can surface zero signals and still be a valid turn.
///
/// Also the wire format for generator-assisted extraction: the generator is
/// prompted to reply with exactly this shape as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    #[serde(default)]
    pub primary_concern: Option<String>,
    #[serde(default)]
    pub emotional_state: Option<Emotion>,
    #[serde(default)]
    pub emotional_intensity: Option<Intensity>,
    #[serde(default)]
    pub life_area: Option<LifeArea>,
    #[serde(default)]
    pub trigger_event: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub significant_quote: Option<String>,
    #[serde(default)]
    pub underlying_fears: Vec<String>,
    #[serde(default)]
    pub unmet_needs: Vec<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub life_situation: Option<String>,
}

impl Analysis {
    /// True when the analysis carries no signal at all.
    pub fn is_empty(&self) -> bool {
        self.primary_concern.is_none()
            && self.emotional_state.is_none()
            && self.life_area.is_none()
            && self.trigger_event.is_none()
            && self.duration.is_none()
            && self.significant_quote.is_none()
            && self.underlying_fears.is_empty()
            && self.unmet_needs.is_empty()
            && self.profession.is_none()
            && self.life_situation.is_none()
    }
}
