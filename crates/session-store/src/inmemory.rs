//! In-memory session store.
//!
//! `HashMap` behind an async `RwLock`; the default for development and tests.
//! Data is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Session, SessionStore};

/// Thread-safe in-memory session store with TTL eviction.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: Uuid) -> Result<Option<Session>, anyhow::Error> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(session) if Utc::now() - session.last_activity <= self.ttl => {
                    return Ok(Some(session.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        info!(session_id = %id, "session expired");
        self.delete(id).await?;
        Ok(None)
    }

    async fn put(&self, session: Session) -> Result<(), anyhow::Error> {
        let mut sessions = self.sessions.write().await;
        debug!(session_id = %session.id, phase = session.phase.as_str(), "session stored");
        sessions.insert(session.id, session);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), anyhow::Error> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id);
        Ok(())
    }

    async fn evict_expired(&self) -> Result<usize, anyhow::Error> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_activity <= self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, "expired sessions removed");
        }
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Phase, Role};

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = InMemorySessionStore::new(60);
        let mut session = Session::new();
        session.add_message(Role::User, "hello");
        let id = session.id;

        store.put(session).await.unwrap();

        let found = store.get(id).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.history.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = InMemorySessionStore::new(60);
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemorySessionStore::new(60);
        let mut session = Session::new();
        let id = session.id;
        store.put(session.clone()).await.unwrap();

        session.phase = Phase::Guidance;
        session.turn_count = 4;
        store.put(session).await.unwrap();

        let found = store.get(id).await.unwrap().unwrap();
        assert_eq!(found.phase, Phase::Guidance);
        assert_eq!(found.turn_count, 4);
    }

    #[tokio::test]
    async fn test_expired_session_dropped_on_get() {
        let store = InMemorySessionStore::new(0);
        let mut session = Session::new();
        session.last_activity = Utc::now() - Duration::minutes(5);
        let id = session.id;
        store.put(session).await.unwrap();

        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict_expired_counts() {
        let store = InMemorySessionStore::new(10);

        let mut stale = Session::new();
        stale.last_activity = Utc::now() - Duration::minutes(30);
        store.put(stale).await.unwrap();
        store.put(Session::new()).await.unwrap();

        assert_eq!(store.evict_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemorySessionStore::new(60);
        let id = Uuid::new_v4();
        store.delete(id).await.unwrap();
        store.delete(id).await.unwrap();
    }
}
