//! # portal-cache
//!
//! Session storage for the portal's cookie-based logins.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Redis Sessions**: Session records stored as JSON with a server-side TTL
//! - **Memory Sessions**: A process-local store for single-node runs and tests
//!
//! ## Example
//!
//! ```ignore
//! use portal_cache::{RedisPool, RedisPoolConfig, RedisSessionStore};
//! use portal_core::SessionStore;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let sessions = RedisSessionStore::new(pool, 1_209_600);
//!
//! let session = sessions.create(user.id).await?;
//! let same = sessions.load(&session.key).await?;
//! ```

pub mod pool;
pub mod session;

// Re-export pool types
pub use pool::{
    RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export session types
pub use session::{MemorySessionStore, RedisSessionStore, SESSION_KEY_PREFIX};
