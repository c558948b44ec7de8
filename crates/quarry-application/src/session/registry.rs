use quarry_core::SessionState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Live sessions keyed by session ID.
///
/// Each session sits behind its own mutex so operations on one session are
/// serialized while different sessions proceed independently.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<SessionState>>>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Gets a session by ID.
    ///
    /// # Returns
    ///
    /// `Some(session)` if it exists, `None` otherwise.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Gets a session by ID, creating an empty one if needed.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        if let Some(session) = self.get(session_id).await {
            return session;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionState::new())))
            .clone()
    }

    /// Removes a session.
    pub async fn remove(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let registry = SessionRegistry::new();
        let first = registry.get_or_create("a").await;
        first.lock().await.record_generation("topic", "report");

        let second = registry.get_or_create("a").await;
        assert_eq!(second.lock().await.current_report(), Some("report"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        registry
            .get_or_create("a")
            .await
            .lock()
            .await
            .record_generation("topic a", "report a");

        let b = registry.get_or_create("b").await;
        assert!(b.lock().await.current_report().is_none());

        registry.remove("a").await;
        assert!(registry.get("a").await.is_none());
        assert!(!registry.is_empty().await);
    }
}
