//! Session records kept in Redis with a matching key TTL.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use portal_core::{RepoResult, SessionRecord, SessionStore, UserId};

use super::new_session_key;
use crate::pool::RedisPool;

/// Key prefix for session records
pub const SESSION_KEY_PREFIX: &str = "session:";

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
    ttl_seconds: i64,
}

impl RedisSessionStore {
    #[must_use]
    pub fn new(pool: RedisPool, ttl_seconds: i64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn key(session_key: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{session_key}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: UserId) -> RepoResult<SessionRecord> {
        let now = Utc::now();
        let record = SessionRecord {
            key: new_session_key(),
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(self.ttl_seconds),
        };

        self.pool
            .put_json(&Self::key(&record.key), &record, self.ttl_seconds)
            .await?;

        tracing::debug!(user_id = %user_id, "Stored session");
        Ok(record)
    }

    async fn load(&self, key: &str) -> RepoResult<Option<SessionRecord>> {
        let record: Option<SessionRecord> = self.pool.get_json(&Self::key(key)).await?;
        Ok(record.filter(|r| !r.is_expired_at(Utc::now())))
    }

    async fn destroy(&self, key: &str) -> RepoResult<bool> {
        let deleted = self.pool.remove(&Self::key(key)).await?;
        if deleted {
            tracing::debug!("Destroyed session");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        assert_eq!(RedisSessionStore::key("abc123"), "session:abc123");
    }

    #[test]
    fn test_session_keys_are_random_hex() {
        let a = new_session_key();
        let b = new_session_key();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
