use crate::session::{Session, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Store of conversation sessions plus the server-side notion of which
/// session id is currently active.
///
/// Sessions are handed out behind a per-session `Mutex` so that concurrent
/// requests against the same id serialize their history appends while
/// requests against different ids do not contend.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session with the given id, creating it on first use.
    async fn get_or_create(&self, id: SessionId) -> Arc<Mutex<Session>>;

    /// The id new chat requests should run against.
    fn active(&self) -> SessionId;

    /// Rotate to a fresh active id, returning it. The previous session is
    /// left intact. Never fails; each call yields a strictly greater id.
    fn rotate(&self) -> SessionId;
}

/// In-memory session store. Process-lifetime only, no persistence.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    active: AtomicU64,
}

impl InMemorySessionStore {
    /// Create a store with the active id starting at 1.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            active: AtomicU64::new(1),
        }
    }

    /// Number of sessions ever created (for diagnostics).
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: SessionId) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&id) {
                return session.clone();
            }
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(id))))
            .clone()
    }

    fn active(&self) -> SessionId {
        self.active.load(Ordering::SeqCst)
    }

    fn rotate(&self) -> SessionId {
        self.active.fetch_add(1, Ordering::SeqCst) + 1
    }
}
