//! SQLite session store.
//!
//! Persistent single-file storage via sqlx. Memory and history are stored as
//! JSON columns; the session row itself stays flat so eviction can run as a
//! single `DELETE`.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE sessions (
//!     id TEXT PRIMARY KEY,
//!     phase TEXT NOT NULL,
//!     turn_count INTEGER NOT NULL,
//!     last_guidance_turn INTEGER,
//!     memory TEXT NOT NULL,
//!     history TEXT NOT NULL,
//!     created_at TEXT NOT NULL,
//!     last_activity TEXT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Phase, Session, SessionStore};

/// Persistent session store backed by a SQLite file.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
    ttl: Duration,
}

impl SqliteSessionStore {
    /// Opens (creating if missing) the database at `database_path`.
    pub async fn new(database_path: &str, ttl_minutes: i64) -> Result<Self, anyhow::Error> {
        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(database_path);
        let pool = SqlitePool::connect_with(options).await?;

        let store = Self {
            pool,
            ttl: Duration::minutes(ttl_minutes),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                phase TEXT NOT NULL,
                turn_count INTEGER NOT NULL,
                last_guidance_turn INTEGER,
                memory TEXT NOT NULL,
                history TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_activity TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn phase_from_str(phase: &str) -> Result<Phase, anyhow::Error> {
        match phase {
            "listening" => Ok(Phase::Listening),
            "guidance" => Ok(Phase::Guidance),
            "closure" => Ok(Phase::Closure),
            other => anyhow::bail!("unknown phase in database: {}", other),
        }
    }

    fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, anyhow::Error> {
        let id: String = row.try_get("id")?;
        let phase: String = row.try_get("phase")?;
        let turn_count: i64 = row.try_get("turn_count")?;
        let last_guidance_turn: Option<i64> = row.try_get("last_guidance_turn")?;
        let memory: String = row.try_get("memory")?;
        let history: String = row.try_get("history")?;
        let created_at: String = row.try_get("created_at")?;
        let last_activity: String = row.try_get("last_activity")?;

        Ok(Session {
            id: Uuid::parse_str(&id)?,
            phase: Self::phase_from_str(&phase)?,
            turn_count: turn_count as u32,
            memory: serde_json::from_str(&memory)?,
            history: serde_json::from_str(&history)?,
            last_guidance_turn: last_guidance_turn.map(|t| t as u32),
            created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
            last_activity: DateTime::parse_from_rfc3339(&last_activity)?.with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, id: Uuid) -> Result<Option<Session>, anyhow::Error> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let session = Self::row_to_session(&row)?;

        if Utc::now() - session.last_activity > self.ttl {
            info!(session_id = %id, "session expired");
            self.delete(id).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn put(&self, session: Session) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO sessions
                (id, phase, turn_count, last_guidance_turn, memory, history,
                 created_at, last_activity)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.id.to_string())
        .bind(session.phase.as_str())
        .bind(session.turn_count as i64)
        .bind(session.last_guidance_turn.map(|t| t as i64))
        .bind(serde_json::to_string(&session.memory)?)
        .bind(serde_json::to_string(&session.history)?)
        .bind(session.created_at.to_rfc3339())
        .bind(session.last_activity.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session.id, phase = session.phase.as_str(), "session stored");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), anyhow::Error> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn evict_expired(&self) -> Result<usize, anyhow::Error> {
        let cutoff = (Utc::now() - self.ttl).to_rfc3339();
        let result = sqlx::query("DELETE FROM sessions WHERE last_activity < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        let evicted = result.rows_affected() as usize;
        if evicted > 0 {
            info!(evicted, "expired sessions removed");
        }
        Ok(evicted)
    }
}
