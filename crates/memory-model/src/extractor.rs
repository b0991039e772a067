//! Signal extraction strategies.
//!
//! One [`Extractor`] interface, two interchangeable implementations:
//!
//! - [`HeuristicExtractor`]: deterministic keyword classifier over the static
//!   lexicon tables. No I/O, fully testable, the fallback for everything.
//! - [`GeneratorExtractor`]: asks the external generator for a structured
//!   JSON analysis of the message. Any transport error or unparseable reply
//!   falls back to the heuristic result, so extraction never fails a turn.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use generator::{ChatMessage, GenerationRequest, Generator};

use crate::analysis::Analysis;
use crate::lexicon::{
    Emotion, Intensity, DURATION_PHRASES, EMOTION_KEYWORDS, LIFE_AREA_KEYWORDS,
};
use crate::story::ConversationMemory;

/// Extracts per-turn signals from a user message.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        memory: &ConversationMemory,
        turn: u32,
        message: &str,
    ) -> Result<Analysis, anyhow::Error>;
}

/// Markers that raise reported intensity to high.
const HIGH_INTENSITY_MARKERS: &[&str] = &[
    "extremely",
    "unbearable",
    "can't take",
    "cannot take",
    "so much",
    "terribly",
    "every day",
    "all the time",
];

/// Phrases introducing a trigger clause; first match wins.
const TRIGGER_MARKERS: &[&str] = &["because ", "after ", "ever since ", "started when "];

/// Profession keyword table; first match wins.
const PROFESSION_KEYWORDS: &[(&str, &str)] = &[
    ("student", "student"),
    ("studying", "student"),
    ("university", "student"),
    ("college", "student"),
    ("exam", "student"),
    ("engineer", "professional"),
    ("developer", "professional"),
    ("teacher", "professional"),
    ("doctor", "professional"),
    ("manager", "professional"),
    ("entrepreneur", "business"),
    ("startup", "business"),
    ("my business", "business"),
    ("retired", "retired"),
    ("homemaker", "homemaker"),
];

/// Life-situation keyword table; first match wins.
const LIFE_SITUATION_KEYWORDS: &[(&str, &str)] = &[
    ("married", "married"),
    ("my husband", "married"),
    ("my wife", "married"),
    ("divorced", "divorced"),
    ("divorce", "divorced"),
    ("single", "single"),
    ("my kids", "parent"),
    ("my children", "parent"),
    ("my son", "parent"),
    ("my daughter", "parent"),
    ("caring for", "caregiver"),
    ("caregiver", "caregiver"),
];

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Deterministic keyword classifier. Same message, same analysis, always.
#[derive(Debug, Clone, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    fn detect_emotion(lower: &str) -> Option<Emotion> {
        for (keyword, emotion) in EMOTION_KEYWORDS {
            if lower.contains(keyword) {
                return Some(*emotion);
            }
        }
        // Indirect signals when no emotion word is present.
        if lower.contains("overwork") || lower.contains("too much work") {
            return Some(Emotion::Stress);
        }
        if lower.contains("no peace") || lower.contains("lack of peace") {
            return Some(Emotion::Stress);
        }
        if lower.contains("no time") || lower.contains("no break") {
            return Some(Emotion::Overwhelm);
        }
        None
    }

    fn detect_intensity(lower: &str) -> Intensity {
        if HIGH_INTENSITY_MARKERS.iter().any(|m| lower.contains(m)) {
            Intensity::High
        } else {
            Intensity::Moderate
        }
    }

    fn detect_trigger(lower: &str) -> Option<String> {
        for marker in TRIGGER_MARKERS {
            if let Some(pos) = lower.find(marker) {
                let clause = lower[pos + marker.len()..].trim();
                if clause.len() > 3 {
                    let clause = truncate_chars(clause, 120);
                    let clause = clause.trim_end_matches(['.', ',', '!', '?']).trim();
                    return Some(clause.to_string());
                }
            }
        }
        None
    }

    fn detect_fears(lower: &str) -> Vec<String> {
        let mut fears = Vec::new();
        for marker in ["afraid of ", "scared of ", "terrified of "] {
            if let Some(pos) = lower.find(marker) {
                let clause = lower[pos + marker.len()..].trim();
                if !clause.is_empty() {
                    let clause = truncate_chars(clause, 80);
                    let clause = clause.trim_end_matches(['.', ',', '!', '?']).trim();
                    fears.push(clause.to_string());
                    return fears;
                }
            }
        }
        if lower.contains("afraid") || lower.contains("scared") || lower.contains("fear") {
            fears.push("uncertainty about what comes next".to_string());
        }
        fears
    }

    fn detect_needs(lower: &str) -> Vec<String> {
        let mut needs = Vec::new();
        let wanting = lower.contains("need")
            || lower.contains("want")
            || lower.contains("wish")
            || lower.contains("looking for");
        if !wanting {
            return needs;
        }
        if lower.contains("help") || lower.contains("support") {
            needs.push("support".to_string());
        }
        if lower.contains("understand") || lower.contains("understood") {
            needs.push("understanding".to_string());
        }
        if lower.contains("peace") || lower.contains("calm") {
            needs.push("peace".to_string());
        }
        if lower.contains("strength") {
            needs.push("strength".to_string());
        }
        if lower.contains("steps") || lower.contains("what to do") || lower.contains("action") {
            needs.push("practical steps".to_string());
        }
        if lower.contains("direction") || lower.contains("guidance") {
            needs.push("guidance".to_string());
        }
        needs
    }

    fn lookup<'a>(table: &[(&str, &'a str)], lower: &str) -> Option<&'a str> {
        table
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, value)| *value)
    }

    fn analyze(message: &str) -> Analysis {
        let lower = message.to_lowercase();

        let emotional_state = Self::detect_emotion(&lower);
        let emotional_intensity = emotional_state.map(|_| Self::detect_intensity(&lower));

        let life_area = LIFE_AREA_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, area)| *area);

        let duration = DURATION_PHRASES
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, phrase)| phrase.to_string());

        let primary_concern = if message.trim().len() > 10 {
            Some(truncate_chars(message.trim(), 200))
        } else {
            None
        };

        let significant_quote = if message.trim().len() > 20 {
            Some(truncate_chars(message.trim(), 150))
        } else {
            None
        };

        Analysis {
            primary_concern,
            emotional_state,
            emotional_intensity,
            life_area,
            trigger_event: Self::detect_trigger(&lower),
            duration,
            significant_quote,
            underlying_fears: Self::detect_fears(&lower),
            unmet_needs: Self::detect_needs(&lower),
            profession: Self::lookup(PROFESSION_KEYWORDS, &lower).map(String::from),
            life_situation: Self::lookup(LIFE_SITUATION_KEYWORDS, &lower).map(String::from),
        }
    }
}

#[async_trait]
impl Extractor for HeuristicExtractor {
    async fn extract(
        &self,
        _memory: &ConversationMemory,
        turn: u32,
        message: &str,
    ) -> Result<Analysis, anyhow::Error> {
        let analysis = Self::analyze(message);
        debug!(
            turn,
            emotion = ?analysis.emotional_state,
            area = ?analysis.life_area,
            "heuristic extraction done"
        );
        Ok(analysis)
    }
}

/// Strips a markdown code fence from a generator reply, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Extractor that delegates analysis to the external generator.
///
/// The generator is prompted to reply with the [`Analysis`] JSON shape.
/// Malformed replies are discarded in favor of the heuristic result rather
/// than surfaced; the caller cannot tell which path produced the analysis.
pub struct GeneratorExtractor {
    generator: Arc<dyn Generator>,
    fallback: HeuristicExtractor,
}

impl GeneratorExtractor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            fallback: HeuristicExtractor::new(),
        }
    }

    fn build_request(memory: &ConversationMemory, turn: u32, message: &str) -> GenerationRequest {
        let known = if turn > 1 {
            let summary = memory.summary();
            if summary.is_empty() {
                "Nothing is known yet.".to_string()
            } else {
                summary
            }
        } else {
            "This is the person's first message.".to_string()
        };

        let system = "You analyze one message from a person describing a difficulty and \
                      extract signals as JSON. Reply with a single JSON object and nothing \
                      else. Fields (all optional): primary_concern (string), emotional_state \
                      (one of: anxiety, sadness, anger, confusion, fear, grief, frustration, \
                      guilt, loneliness, stress, overwhelm, hopelessness), emotional_intensity \
                      (low|moderate|high), life_area (work, career, family, relationships, \
                      health, spiritual, financial), trigger_event (string), duration (string), \
                      significant_quote (verbatim phrase from the message), underlying_fears \
                      (array of strings), unmet_needs (array of strings), profession (string), \
                      life_situation (string). Omit anything not clearly present.";

        let user = format!(
            "ALREADY UNDERSTOOD:\n{}\n\nMESSAGE (turn {}):\n\"{}\"",
            known, turn, message
        );

        GenerationRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
            .with_temperature(0.4)
            .with_max_tokens(500)
    }
}

#[async_trait]
impl Extractor for GeneratorExtractor {
    async fn extract(
        &self,
        memory: &ConversationMemory,
        turn: u32,
        message: &str,
    ) -> Result<Analysis, anyhow::Error> {
        let request = Self::build_request(memory, turn, message);

        let reply = match self.generator.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(turn, error = %e, "generator extraction unavailable, using heuristic");
                return self.fallback.extract(memory, turn, message).await;
            }
        };

        match serde_json::from_str::<Analysis>(strip_code_fence(&reply)) {
            Ok(analysis) => {
                debug!(turn, "generator extraction parsed");
                Ok(analysis)
            }
            Err(e) => {
                warn!(turn, error = %e, "malformed generator analysis, using heuristic");
                self.fallback.extract(memory, turn, message).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LifeArea;

    #[tokio::test]
    async fn test_heuristic_scenario_first_turn() {
        let extractor = HeuristicExtractor::new();
        let memory = ConversationMemory::default();
        let analysis = extractor
            .extract(&memory, 1, "I've been so anxious about my job for weeks")
            .await
            .unwrap();

        assert_eq!(analysis.emotional_state, Some(Emotion::Anxiety));
        assert_eq!(analysis.life_area, Some(LifeArea::Work));
        assert_eq!(analysis.duration.as_deref(), Some("for weeks"));
        assert!(analysis.significant_quote.is_some());
    }

    #[tokio::test]
    async fn test_heuristic_is_deterministic() {
        let extractor = HeuristicExtractor::new();
        let memory = ConversationMemory::default();
        let message = "I'm overwhelmed because my manager doubled my workload";
        let a = extractor.extract(&memory, 2, message).await.unwrap();
        let b = extractor.extract(&memory, 2, message).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_heuristic_trigger_and_fear_capture() {
        let extractor = HeuristicExtractor::new();
        let memory = ConversationMemory::default();
        let analysis = extractor
            .extract(
                &memory,
                2,
                "It started because my manager changed, and I'm afraid of failing everyone.",
            )
            .await
            .unwrap();

        let trigger = analysis.trigger_event.unwrap();
        assert!(trigger.starts_with("my manager changed"));
        assert_eq!(analysis.underlying_fears, vec!["failing everyone"]);
    }

    #[tokio::test]
    async fn test_heuristic_needs_require_wanting_verb() {
        let extractor = HeuristicExtractor::new();
        let memory = ConversationMemory::default();

        let with_verb = extractor
            .extract(&memory, 1, "I just need some peace and quiet in my life")
            .await
            .unwrap();
        assert_eq!(with_verb.unmet_needs, vec!["peace"]);

        let without_verb = extractor
            .extract(&memory, 1, "there is no peace anywhere around here lately")
            .await
            .unwrap();
        assert!(without_verb.unmet_needs.is_empty());
    }

    #[tokio::test]
    async fn test_short_message_yields_sparse_analysis() {
        let extractor = HeuristicExtractor::new();
        let memory = ConversationMemory::default();
        let analysis = extractor.extract(&memory, 1, "hello").await.unwrap();
        assert!(analysis.is_empty());
    }

    struct CannedGenerator(String);

    #[async_trait]
    impl Generator for CannedGenerator {
        async fn complete(&self, _request: &GenerationRequest) -> Result<String, anyhow::Error> {
            Ok(self.0.clone())
        }
    }

    struct DownGenerator;

    #[async_trait]
    impl Generator for DownGenerator {
        async fn complete(&self, _request: &GenerationRequest) -> Result<String, anyhow::Error> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_generator_extractor_parses_fenced_json() {
        let reply = "```json\n{\"emotional_state\": \"sadness\", \"life_area\": \"family\"}\n```";
        let extractor = GeneratorExtractor::new(Arc::new(CannedGenerator(reply.to_string())));
        let memory = ConversationMemory::default();

        let analysis = extractor
            .extract(&memory, 1, "things are hard at home")
            .await
            .unwrap();
        assert_eq!(analysis.emotional_state, Some(Emotion::Sadness));
        assert_eq!(analysis.life_area, Some(LifeArea::Family));
    }

    #[tokio::test]
    async fn test_generator_extractor_malformed_falls_back() {
        let extractor =
            GeneratorExtractor::new(Arc::new(CannedGenerator("not json at all".to_string())));
        let memory = ConversationMemory::default();

        let analysis = extractor
            .extract(&memory, 1, "I feel anxious about work")
            .await
            .unwrap();
        // Heuristic result, not an error.
        assert_eq!(analysis.emotional_state, Some(Emotion::Anxiety));
    }

    #[tokio::test]
    async fn test_generator_extractor_unavailable_falls_back() {
        let extractor = GeneratorExtractor::new(Arc::new(DownGenerator));
        let memory = ConversationMemory::default();

        let analysis = extractor
            .extract(&memory, 1, "I feel so lonely these days")
            .await
            .unwrap();
        assert_eq!(analysis.emotional_state, Some(Emotion::Loneliness));
    }
}
