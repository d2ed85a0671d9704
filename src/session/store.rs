use super::session::{CallSession, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A session behind its own lock; every read-modify-write holds it.
pub type SessionHandle = Arc<Mutex<CallSession>>;

/// Storage for call sessions, keyed by session id with a secondary index on
/// the provider's call id.
///
/// Implementations hand out one lock per session so that callbacks for
/// different calls never wait on each other.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session and return its handle
    async fn insert(&self, session: CallSession) -> SessionHandle;

    async fn get(&self, id: SessionId) -> Option<SessionHandle>;

    /// Index `id` under the provider's call id. The first binding wins.
    async fn bind_provider_call_id(&self, id: SessionId, call_id: &str);

    async fn find_by_provider_call_id(&self, call_id: &str) -> Option<SessionHandle>;
}

/// In-process session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    by_provider_id: RwLock<HashMap<String, SessionId>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: CallSession) -> SessionHandle {
        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::clone(&handle));
        handle
    }

    async fn get(&self, id: SessionId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    async fn bind_provider_call_id(&self, id: SessionId, call_id: &str) {
        let mut index = self.by_provider_id.write().await;
        index.entry(call_id.to_string()).or_insert(id);
    }

    async fn find_by_provider_call_id(&self, call_id: &str) -> Option<SessionHandle> {
        let id = {
            let index = self.by_provider_id.read().await;
            index.get(call_id).copied()
        }?;
        self.get(id).await
    }
}
