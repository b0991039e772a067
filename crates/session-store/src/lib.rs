//! # Session Store
//!
//! Conversation session state and its storage interface.
//!
//! A [`Session`] owns one [`ConversationMemory`](memory_model::ConversationMemory)
//! and advances strictly turn by turn; callers must serialize processing per
//! session id (single writer per session). Independent sessions are fully
//! parallel.
//!
//! [`SessionStore`] hides the storage technology behind a last-write-wins
//! key-value interface with TTL eviction. Two implementations:
//!
//! - [`InMemorySessionStore`] - `HashMap` behind an async `RwLock`; state is
//!   lost on restart
//! - [`SqliteSessionStore`] - persistent single-file storage via sqlx
//!
//! TTL expiry is enforced on read: an expired session is deleted and reported
//! as absent, which callers surface as "start a new conversation".

pub mod inmemory;
pub mod sqlite;
mod types;

pub use inmemory::InMemorySessionStore;
pub use sqlite::SqliteSessionStore;
pub use types::{HistoryEntry, Phase, Role, Session};

use async_trait::async_trait;
use uuid::Uuid;

/// Last-write-wins session storage with TTL eviction.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Retrieves a session by id. Returns `None` when absent or expired;
    /// an expired session is deleted as a side effect.
    async fn get(&self, id: Uuid) -> Result<Option<Session>, anyhow::Error>;

    /// Inserts or replaces a session.
    async fn put(&self, session: Session) -> Result<(), anyhow::Error>;

    /// Deletes a session. Succeeds silently when absent.
    async fn delete(&self, id: Uuid) -> Result<(), anyhow::Error>;

    /// Removes every expired session and returns how many were dropped.
    /// Runs asynchronously to turn processing and never touches a session
    /// a caller currently holds by value.
    async fn evict_expired(&self) -> Result<usize, anyhow::Error>;
}
