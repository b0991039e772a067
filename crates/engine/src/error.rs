//! Engine error taxonomy.
//!
//! Most failure categories never reach the caller: transient external
//! failures (generator or embedder down, timed out) are recovered with the
//! heuristic/template paths inside the turn, and malformed generator analyses
//! are discarded for the heuristic extraction. What remains visible here is
//! what the caller must act on.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The session does not exist or has expired; the caller should start a
    /// new conversation.
    #[error("session {0} not found or expired; start a new conversation")]
    SessionNotFound(Uuid),

    #[error("session store error: {0}")]
    Store(#[source] anyhow::Error),
}
