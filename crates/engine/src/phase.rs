//! Conversation phase state machine.
//!
//! Evaluation order per turn:
//!
//! 1. Closure lexicon match: CLOSURE, unconditionally.
//! 2. Readiness at/above threshold, or the listening-turn cap reached,
//!    provided the guidance cooldown holds: GUIDANCE.
//! 3. Otherwise: LISTENING.
//!
//! CLOSURE is soft-terminal: a later substantive message simply re-evaluates
//! rules 2-3 on its own turn. The oscillation control (readiness reset,
//! last_guidance_turn bookkeeping) happens where guidance is entered, in the
//! controller.

use session_store::{Phase, Session};
use tracing::debug;

use crate::config::EngineConfig;

/// Words that may appear in a pure acknowledgment message.
const CLOSURE_WORDS: &[&str] = &[
    "ok", "okay", "k", "thanks", "thank", "you", "fine", "got", "it", "alright", "right",
    "good", "sounds", "great", "bye", "goodbye", "helps", "helped", "that", "this", "so",
    "much", "a", "lot", "cool", "perfect",
];

/// Longest message (in words) still considered a pure acknowledgment.
const CLOSURE_MAX_WORDS: usize = 5;

/// Decides the phase for each turn from readiness, turn counters and the
/// guidance cooldown.
pub struct PhaseMachine {
    config: EngineConfig,
}

impl PhaseMachine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// True when the message is a short acknowledgment like "ok thanks".
    ///
    /// Every word must come from the closure lexicon: "ok but it got worse"
    /// is substantive and must not close the conversation.
    pub fn is_closure_message(&self, message: &str) -> bool {
        let normalized = message.to_lowercase();
        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() || words.len() > CLOSURE_MAX_WORDS {
            return false;
        }
        words.iter().all(|w| CLOSURE_WORDS.contains(w))
    }

    /// Evaluates the phase for the current turn. Pure: mutates nothing.
    pub fn evaluate(&self, session: &Session, message: &str) -> Phase {
        if self.is_closure_message(message) {
            debug!(turn = session.turn_count, "closure acknowledgment");
            return Phase::Closure;
        }

        let readiness = session.memory.readiness_for_wisdom;
        let ready = readiness >= self.config.readiness_threshold
            || session.turn_count >= self.config.max_listening_turns;

        let cooldown_holds = match session.turns_since_guidance() {
            None => true,
            Some(elapsed) => elapsed >= self.config.guidance_cooldown_turns,
        };

        if ready && cooldown_holds {
            debug!(
                turn = session.turn_count,
                readiness, "transitioning to guidance"
            );
            Phase::Guidance
        } else {
            Phase::Listening
        }
    }
}
