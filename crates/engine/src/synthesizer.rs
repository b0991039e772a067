//! Query synthesis: turns the accumulated memory into a retrieval query and
//! generation directives.
//!
//! Pure and deterministic: an identical memory snapshot always yields a
//! byte-identical query string and directives. No clocks, no randomness.

use memory_model::{ConversationMemory, Emotion, Intensity, LifeArea};

/// Delivery style requested from the generator (or the fallback bank).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStyle {
    GentleNurturing,
    DirectPractical,
    Philosophical,
    StoryBased,
}

impl ResponseStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStyle::GentleNurturing => "gentle-nurturing",
            ResponseStyle::DirectPractical => "direct-practical",
            ResponseStyle::Philosophical => "philosophical",
            ResponseStyle::StoryBased => "story-based",
        }
    }

    /// Style instruction passed to the generator.
    pub fn instruction(&self) -> &'static str {
        match self {
            ResponseStyle::GentleNurturing => {
                "Extra gentle, comforting, validating. Like a caring elder speaking softly."
            }
            ResponseStyle::DirectPractical => {
                "Warm but focused on action. Clear steps, no fluff. Still compassionate."
            }
            ResponseStyle::Philosophical => {
                "Thoughtful, exploring deeper meaning. Still accessible and grounded."
            }
            ResponseStyle::StoryBased => {
                "Use narrative and examples from the source epics when relevant. Engaging and relatable."
            }
        }
    }
}

/// Structured instructions for the response composer and generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Directives {
    pub style: ResponseStyle,
    /// What the person needs from the guidance: comfort, clarity, hope...
    pub guidance_type: &'static str,
    /// Concepts to weave in and to boost during retrieval.
    pub concepts: Vec<String>,
    /// Sources to retrieve from; `None` allows the whole corpus.
    pub allowed_sources: Option<Vec<String>>,
    /// One-line summary of the accumulated understanding.
    pub summary: String,
}

fn guidance_type_for(emotion: Option<Emotion>) -> &'static str {
    match emotion {
        Some(Emotion::Anxiety) => "comfort",
        Some(Emotion::Sadness) => "comfort",
        Some(Emotion::Anger) => "understanding",
        Some(Emotion::Confusion) => "clarity",
        Some(Emotion::Fear) => "reassurance",
        Some(Emotion::Grief) => "comfort",
        Some(Emotion::Frustration) => "perspective",
        Some(Emotion::Guilt) => "forgiveness",
        Some(Emotion::Loneliness) => "connection",
        Some(Emotion::Stress) => "relief",
        Some(Emotion::Overwhelm) => "simplification",
        Some(Emotion::Hopelessness) => "hope",
        None => "guidance",
    }
}

fn sources_for(area: LifeArea) -> Vec<String> {
    let names: &[&str] = match area {
        LifeArea::Work => &["Bhagavad Gita", "Mahabharata"],
        LifeArea::Career => &["Bhagavad Gita", "Mahabharata"],
        LifeArea::Family => &["Ramayana", "Mahabharata", "Bhagavad Gita"],
        LifeArea::Relationships => &["Ramayana", "Bhagavad Gita"],
        LifeArea::Health => &["Upanishads", "Bhagavad Gita"],
        LifeArea::Spiritual => &["Bhagavad Gita", "Upanishads"],
        LifeArea::Financial => &["Mahabharata", "Bhagavad Gita"],
    };
    names.iter().map(|s| s.to_string()).collect()
}

fn wants(memory: &ConversationMemory, markers: &[&str]) -> bool {
    memory.story.unmet_needs.iter().any(|need| {
        let need = need.to_lowercase();
        markers.iter().any(|m| need.contains(m))
    })
}

fn style_for(memory: &ConversationMemory) -> ResponseStyle {
    let story = &memory.story;
    let high_intensity = memory.latest_intensity() == Some(Intensity::High);
    let high_distress = story
        .emotional_state
        .map(|e| e.is_high_distress())
        .unwrap_or(false);

    if high_intensity || high_distress {
        return ResponseStyle::GentleNurturing;
    }
    if wants(memory, &["practical steps", "action", "steps"]) {
        return ResponseStyle::DirectPractical;
    }
    if wants(memory, &["understanding", "meaning"])
        || story.emotional_state == Some(Emotion::Confusion)
    {
        return ResponseStyle::Philosophical;
    }
    if matches!(
        story.life_area,
        Some(LifeArea::Family) | Some(LifeArea::Relationships)
    ) {
        return ResponseStyle::StoryBased;
    }
    ResponseStyle::GentleNurturing
}

/// Number of concept tags carried into the query string.
const QUERY_CONCEPTS: usize = 3;

/// Converts the accumulated memory into a retrieval query and generation
/// directives. Pure function of the memory snapshot.
pub fn synthesize(memory: &ConversationMemory) -> (String, Directives) {
    let story = &memory.story;
    let mut parts: Vec<String> = Vec::new();

    if !story.primary_concern.is_empty() {
        parts.push(story.primary_concern.clone());
    }
    if let Some(emotion) = story.emotional_state {
        parts.push(format!("dealing with {}", emotion.as_str()));
    }
    if let Some(area) = story.life_area {
        parts.push(format!("regarding {}", area.as_str()));
    }
    if !memory.relevant_concepts.is_empty() {
        parts.push(
            memory
                .relevant_concepts
                .iter()
                .take(QUERY_CONCEPTS)
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
        );
    }

    let query = parts.join(" ");
    let directives = Directives {
        style: style_for(memory),
        guidance_type: guidance_type_for(story.emotional_state),
        concepts: memory.relevant_concepts.clone(),
        allowed_sources: story.life_area.map(sources_for),
        summary: memory.summary(),
    };

    (query, directives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_model::Analysis;

    fn memory_with(emotion: Option<Emotion>, area: Option<LifeArea>) -> ConversationMemory {
        let mut memory = ConversationMemory::default();
        let analysis = Analysis {
            primary_concern: Some("anxious about my job for weeks".to_string()),
            emotional_state: emotion,
            life_area: area,
            ..Analysis::default()
        };
        memory.absorb(&analysis, 1, 20);
        memory
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let memory = memory_with(Some(Emotion::Anxiety), Some(LifeArea::Work));
        let (query_a, directives_a) = synthesize(&memory);
        let (query_b, directives_b) = synthesize(&memory);
        assert_eq!(query_a, query_b);
        assert_eq!(directives_a, directives_b);
    }

    #[test]
    fn test_query_contains_concern_emotion_area() {
        let memory = memory_with(Some(Emotion::Anxiety), Some(LifeArea::Work));
        let (query, _) = synthesize(&memory);
        assert!(query.contains("anxious about my job"));
        assert!(query.contains("dealing with anxiety"));
        assert!(query.contains("regarding work"));
    }

    #[test]
    fn test_empty_memory_yields_empty_query() {
        let (query, directives) = synthesize(&ConversationMemory::default());
        assert!(query.is_empty());
        assert_eq!(directives.guidance_type, "guidance");
        assert_eq!(directives.style, ResponseStyle::GentleNurturing);
        assert!(directives.allowed_sources.is_none());
    }

    #[test]
    fn test_high_intensity_forces_gentle() {
        let mut memory = memory_with(Some(Emotion::Anxiety), None);
        memory.record_emotion(2, Emotion::Anxiety, Intensity::High);
        memory.story.unmet_needs = vec!["practical steps".to_string()];
        let (_, directives) = synthesize(&memory);
        assert_eq!(directives.style, ResponseStyle::GentleNurturing);
    }

    #[test]
    fn test_action_need_selects_practical() {
        let mut memory = memory_with(Some(Emotion::Stress), None);
        memory.story.unmet_needs = vec!["practical steps".to_string()];
        let (_, directives) = synthesize(&memory);
        assert_eq!(directives.style, ResponseStyle::DirectPractical);
        assert_eq!(directives.guidance_type, "relief");
    }

    #[test]
    fn test_meaning_need_selects_philosophical() {
        let mut memory = memory_with(Some(Emotion::Sadness), None);
        memory.story.unmet_needs = vec!["understanding".to_string()];
        let (_, directives) = synthesize(&memory);
        assert_eq!(directives.style, ResponseStyle::Philosophical);
    }

    #[test]
    fn test_family_area_selects_story_based() {
        let memory = memory_with(Some(Emotion::Sadness), Some(LifeArea::Family));
        let (_, directives) = synthesize(&memory);
        assert_eq!(directives.style, ResponseStyle::StoryBased);
        let sources = directives.allowed_sources.unwrap();
        assert!(sources.contains(&"Ramayana".to_string()));
    }

    #[test]
    fn test_hopelessness_maps_to_hope_and_gentle() {
        let memory = memory_with(Some(Emotion::Hopelessness), None);
        let (_, directives) = synthesize(&memory);
        assert_eq!(directives.guidance_type, "hope");
        assert_eq!(directives.style, ResponseStyle::GentleNurturing);
    }
}
