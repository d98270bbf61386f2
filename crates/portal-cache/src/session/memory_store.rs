//! Process-local session store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;

use portal_core::{RepoResult, SessionRecord, SessionStore, UserId};

use super::new_session_key;

/// Sessions held in a concurrent map; lost on restart
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, SessionRecord>>,
    ttl_seconds: i64,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl_seconds,
        }
    }

    /// Number of stored sessions; expired ones stay until the next `create` or `load`
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: UserId) -> RepoResult<SessionRecord> {
        let now = Utc::now();
        // Sweep sessions that were never loaded again
        self.sessions.retain(|_, record| !record.is_expired_at(now));

        let record = SessionRecord {
            key: new_session_key(),
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(self.ttl_seconds),
        };
        self.sessions.insert(record.key.clone(), record.clone());
        Ok(record)
    }

    async fn load(&self, key: &str) -> RepoResult<Option<SessionRecord>> {
        let now = Utc::now();
        let record = self.sessions.get(key).map(|entry| entry.value().clone());

        match record {
            Some(record) if record.is_expired_at(now) => {
                self.sessions.remove(key);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn destroy(&self, key: &str) -> RepoResult<bool> {
        Ok(self.sessions.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_load_destroy() {
        let store = MemorySessionStore::new(60);
        let session = store.create(UserId::new(7)).await.unwrap();

        let loaded = store.load(&session.key).await.unwrap().unwrap();
        assert_eq!(loaded.user_id, UserId::new(7));

        assert!(store.destroy(&session.key).await.unwrap());
        assert!(store.load(&session.key).await.unwrap().is_none());
        assert!(!store.destroy(&session.key).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = MemorySessionStore::new(0);
        let session = store.create(UserId::new(1)).await.unwrap();

        assert!(store.load(&session.key).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_sweeps_abandoned_sessions() {
        let store = MemorySessionStore::new(0);
        for id in 1..=3 {
            store.create(UserId::new(id)).await.unwrap();
        }
        assert_eq!(store.len(), 1);

        let live = MemorySessionStore::new(60);
        live.create(UserId::new(1)).await.unwrap();
        live.create(UserId::new(2)).await.unwrap();
        assert_eq!(live.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let store = MemorySessionStore::new(60);
        assert!(store.load("missing").await.unwrap().is_none());
    }
}
