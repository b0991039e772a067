//! # Safety Gate
//!
//! Two passes around every turn:
//!
//! - **Crisis check** (before anything else): scans the incoming message
//!   against a fixed crisis lexicon. On a hit the turn is intercepted with a
//!   fixed payload (support resources plus a grounding script) and nothing
//!   else runs: no retrieval, no generation, no phase or turn advancement.
//! - **Response sanitization** (after composition): blame and fatalism
//!   phrasings are rewritten in place to supportive equivalents. Rewriting is
//!   deterministic; there is no regeneration loop.
//!
//! The gate can be disengaged via [`SafetyGate::disabled`] so tests can
//! exercise conversation flow with crisis-adjacent fixtures.

use regex::RegexBuilder;
use tracing::warn;

/// Phrases that indicate the person may be in danger.
const CRISIS_LEXICON: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "dont want to live",
    "don't want to live",
    "self-harm",
    "hurt myself",
    "no point living",
    "better off dead",
    "wish i was dead",
    "end it all",
    "take my life",
    "cant go on",
    "can't go on",
    "give up on life",
    "nothing to live for",
];

/// Blame/fatalism phrasings and their supportive replacements.
const BANNED_REWRITES: &[(&str, &str)] = &[
    ("it was meant to be", "this is a difficult experience"),
    ("you deserve this", "you are going through something hard"),
    ("this is your fault", "this situation has affected you deeply"),
    ("you should not feel", "your feelings are valid, and"),
    ("just be positive", "be gentle with yourself"),
    ("everything happens for a reason", "this is part of your journey"),
    ("stop feeling", "acknowledge these feelings, and"),
    ("get over it", "work through this at your own pace"),
    ("others have it worse", "your experience is valid"),
    ("think about the bright side", "take things one step at a time"),
    ("you brought this upon yourself", "you are facing a difficult situation"),
];

const SUPPORT_RESOURCES: &str = "\
Please know that speaking with a mental health professional can be incredibly helpful.

You can reach out right now:
- iCall: 9152987821 (Mon-Sat, 8am-10pm)
- Vandrevala Foundation: 1860-2662-345 (24/7)
- International directory: findahelpline.com

You are not alone in this.";

const GROUNDING_SCRIPT: &str = "\
Right now, let's take one slow breath together. Breathe in gently for four \
counts... hold... and breathe out for six. You don't have to carry this alone.

Would you like to share more about what's happening? I'm here to listen \
without judgment.";

/// The fixed payload returned when a crisis signal is detected.
#[derive(Debug, Clone, PartialEq)]
pub struct CrisisPayload {
    pub resources: String,
    pub grounding: String,
}

impl CrisisPayload {
    /// Renders the payload as one response text.
    pub fn render(&self) -> String {
        format!(
            "I hear you, and I want you to know that what you're feeling matters deeply.\n\n{}\n\n{}",
            self.resources, self.grounding
        )
    }
}

/// A compiled banned-pattern rewrite rule.
struct Rewrite {
    pattern: regex::Regex,
    replacement: &'static str,
}

/// Crisis interception and response sanitization.
pub struct SafetyGate {
    enabled: bool,
    rewrites: Vec<Rewrite>,
}

impl SafetyGate {
    pub fn new() -> Self {
        let rewrites = BANNED_REWRITES
            .iter()
            .map(|(phrase, replacement)| Rewrite {
                // Literal phrases; escape so future entries with
                // punctuation stay literal.
                pattern: RegexBuilder::new(&regex::escape(phrase))
                    .case_insensitive(true)
                    .build()
                    .expect("banned phrase patterns are literal and always compile"),
                replacement,
            })
            .collect();
        Self {
            enabled: true,
            rewrites,
        }
    }

    /// A gate that intercepts nothing and rewrites nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            rewrites: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Scans a message for crisis signals. `Some` means the turn must be
    /// answered with the payload and nothing else.
    pub fn check_crisis(&self, message: &str) -> Option<CrisisPayload> {
        if !self.enabled {
            return None;
        }
        let lower = message.to_lowercase();
        for keyword in CRISIS_LEXICON {
            if lower.contains(keyword) {
                warn!(keyword, "crisis signal detected");
                return Some(CrisisPayload {
                    resources: SUPPORT_RESOURCES.to_string(),
                    grounding: GROUNDING_SCRIPT.to_string(),
                });
            }
        }
        None
    }

    /// Rewrites banned phrasings in a composed response. Returns the input
    /// unchanged when nothing matches or the gate is disengaged.
    pub fn sanitize_response(&self, response: &str) -> String {
        if !self.enabled {
            return response.to_string();
        }
        let mut sanitized = response.to_string();
        for rewrite in &self.rewrites {
            if rewrite.pattern.is_match(&sanitized) {
                warn!(replacement = rewrite.replacement, "banned phrasing rewritten");
                sanitized = rewrite
                    .pattern
                    .replace_all(&sanitized, rewrite.replacement)
                    .into_owned();
            }
        }
        sanitized
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crisis_keyword_detected() {
        let gate = SafetyGate::new();
        let payload = gate.check_crisis("some days I just want to end it all");
        assert!(payload.is_some());
        let text = payload.unwrap().render();
        assert!(text.contains("9152987821"));
        assert!(text.contains("breath"));
    }

    #[test]
    fn test_crisis_detection_is_case_insensitive() {
        let gate = SafetyGate::new();
        assert!(gate.check_crisis("I CAN'T GO ON like this").is_some());
    }

    #[test]
    fn test_ordinary_distress_not_intercepted() {
        let gate = SafetyGate::new();
        assert!(gate
            .check_crisis("I'm really stressed about my deadlines")
            .is_none());
    }

    #[test]
    fn test_disabled_gate_passes_everything() {
        let gate = SafetyGate::disabled();
        assert!(gate.check_crisis("I want to die").is_none());
        let text = "get over it";
        assert_eq!(gate.sanitize_response(text), text);
    }

    #[test]
    fn test_banned_phrase_rewritten() {
        let gate = SafetyGate::new();
        let sanitized =
            gate.sanitize_response("Honestly, everything happens for a reason, you know.");
        assert!(!sanitized.to_lowercase().contains("everything happens for a reason"));
        assert!(sanitized.contains("this is part of your journey"));
    }

    #[test]
    fn test_rewrite_is_case_insensitive_and_repeatable() {
        let gate = SafetyGate::new();
        let sanitized = gate.sanitize_response("Just Be Positive. I said just be positive!");
        assert!(!sanitized.to_lowercase().contains("just be positive"));
        assert_eq!(sanitized.matches("be gentle with yourself").count(), 2);
    }

    #[test]
    fn test_clean_response_unchanged() {
        let gate = SafetyGate::new();
        let text = "That sounds heavy. You're carrying a lot right now.";
        assert_eq!(gate.sanitize_response(text), text);
    }

    #[test]
    fn test_sanitize_is_deterministic() {
        let gate = SafetyGate::new();
        let input = "you brought this upon yourself, so get over it";
        assert_eq!(gate.sanitize_response(input), gate.sanitize_response(input));
    }
}
