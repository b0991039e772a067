//! # Conversation Engine
//!
//! The turn-processing core: decides each turn whether enough has been
//! understood to retrieve and compose grounded guidance, or whether to keep
//! listening.
//!
//! ## Modules
//!
//! - [`config`] - tunable thresholds and retrieval parameters
//! - [`error`] - the engine error taxonomy
//! - [`phase`] - LISTENING / GUIDANCE / CLOSURE state machine
//! - [`synthesizer`] - deterministic memory-to-query synthesis
//! - [`composer`] - guidance composition with generator delegation and
//!   deterministic template fallback
//! - [`controller`] - per-turn orchestration of safety, memory, phase,
//!   retrieval and composition
//!
//! ## Turn order
//!
//! Safety gate first; on a crisis hit nothing else runs and the session is
//! left exactly as it was. Otherwise the turn counts, the phase machine
//! decides on the understanding accumulated so far, memory absorbs the
//! message, and the matching composition path produces the response. Every
//! failure inside a turn resolves to a response; nothing propagates past the
//! turn boundary.

pub mod composer;
pub mod config;
pub mod controller;
pub mod error;
pub mod phase;
pub mod synthesizer;

pub use composer::ResponseComposer;
pub use config::EngineConfig;
pub use controller::{Citation, ConversationController, TurnOutcome};
pub use error::EngineError;
pub use phase::PhaseMachine;
pub use synthesizer::{synthesize, Directives, ResponseStyle};
