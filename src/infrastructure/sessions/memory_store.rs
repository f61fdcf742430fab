use crate::domain::{Session, SessionStore, SessionStorePtr, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Creates an in-process session store. Expiry is checked on read.
pub fn create_memory_session_store() -> SessionStorePtr {
    Arc::new(MemorySessionStore::default())
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    // ---
    async fn save(&self, session: &Session) -> StoreResult<()> {
        // ---
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired());
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, token: &str) -> StoreResult<Option<Session>> {
        // ---
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).filter(|s| !s.is_expired()).cloned())
    }

    async fn destroy(&self, token: &str) -> StoreResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
