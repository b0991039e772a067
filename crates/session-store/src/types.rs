//! Session state types.

use chrono::{DateTime, Utc};
use memory_model::ConversationMemory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Phase of the conversation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Building understanding; responses are empathetic follow-up questions.
    #[default]
    Listening,
    /// Enough is understood; respond with retrieved, grounded guidance.
    Guidance,
    /// The person signalled they are done. Soft-terminal: a later
    /// substantive message re-evaluates normally.
    Closure,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Listening => "listening",
            Phase::Guidance => "guidance",
            Phase::Closure => "closure",
        }
    }
}

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// State of one conversation, owned by exactly one caller at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub phase: Phase,
    /// Number of processed user messages. Crisis-intercepted messages do
    /// not count.
    pub turn_count: u32,
    pub memory: ConversationMemory,
    pub history: Vec<HistoryEntry>,
    /// Turn at which guidance was last entered. Only ever increases.
    pub last_guidance_turn: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Creates a fresh session in the listening phase.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Listening,
            turn_count: 0,
            memory: ConversationMemory::default(),
            history: Vec::new(),
            last_guidance_turn: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Appends a message to the history and refreshes activity.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(HistoryEntry {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
        self.touch();
    }

    /// Refreshes the activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Turns elapsed since guidance was last given, if it ever was.
    pub fn turns_since_guidance(&self) -> Option<u32> {
        self.last_guidance_turn
            .map(|last| self.turn_count.saturating_sub(last))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_initial_state() {
        let session = Session::new();
        assert_eq!(session.phase, Phase::Listening);
        assert_eq!(session.turn_count, 0);
        assert!(session.last_guidance_turn.is_none());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_add_message_touches_activity() {
        let mut session = Session::new();
        let before = session.last_activity;
        session.add_message(Role::User, "hello");
        assert_eq!(session.history.len(), 1);
        assert!(session.last_activity >= before);
    }

    #[test]
    fn test_turns_since_guidance() {
        let mut session = Session::new();
        assert_eq!(session.turns_since_guidance(), None);
        session.turn_count = 6;
        session.last_guidance_turn = Some(4);
        assert_eq!(session.turns_since_guidance(), Some(2));
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let mut session = Session::new();
        session.add_message(Role::User, "I feel anxious");
        session.turn_count = 1;

        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, session.id);
        assert_eq!(restored.phase, Phase::Listening);
        assert_eq!(restored.history.len(), 1);
    }
}
