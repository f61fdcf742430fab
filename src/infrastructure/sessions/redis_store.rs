//! Session storage in Redis.
//!
//! Each session lives under `session:{token}` as JSON, written with `SET EX`
//! so Redis drops it when the TTL runs out.

use crate::domain::{Session, SessionStore, SessionStorePtr, StoreError, StoreResult};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::sync::Arc;

// ---

pub fn create_redis_session_store(client: Client) -> SessionStorePtr {
    Arc::new(RedisSessionStore::new(client))
}

pub struct RedisSessionStore {
    // ---
    client: Client,
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

impl RedisSessionStore {
    // ---
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a new multiplexed Redis connection.
    async fn get_conn(&self) -> StoreResult<MultiplexedConnection> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| {
                tracing::error!("Failed to connect to Redis: {:?}", err);
                StoreError::Unavailable(err.into())
            })
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    // ---
    async fn save(&self, session: &Session) -> StoreResult<()> {
        // ---
        let ttl_seconds = (session.expires_at - session.created_at).num_seconds().max(1) as u64;

        let session_json = serde_json::to_string(session).map_err(|e| {
            //
            tracing::error!("Failed to serialize session data: {}", e);
            StoreError::Unavailable(e.into())
        })?;

        let mut conn = self.get_conn().await?;
        conn.set_ex::<_, _, ()>(session_key(&session.token), session_json, ttl_seconds)
            .await
            .map_err(|e| {
                //
                tracing::error!("Failed to store session in Redis: {}", e);
                StoreError::Unavailable(e.into())
            })?;

        tracing::debug!(role = %session.role(), "stored session");
        Ok(())
    }

    async fn load(&self, token: &str) -> StoreResult<Option<Session>> {
        // ---
        let mut conn = self.get_conn().await?;
        let raw: Option<String> = conn
            .get(session_key(token))
            .await
            .map_err(|e| StoreError::Unavailable(e.into()))?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        // A record we cannot read is treated as no session rather than an outage.
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.is_expired() => Ok(Some(session)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Discarding unreadable session record: {}", e);
                Ok(None)
            }
        }
    }

    async fn destroy(&self, token: &str) -> StoreResult<()> {
        // ---
        let mut conn = self.get_conn().await?;
        conn.del::<_, ()>(session_key(token))
            .await
            .map_err(|e| StoreError::Unavailable(e.into()))?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        // ---
        let mut conn = self.get_conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.into()))?;
        Ok(())
    }
}
