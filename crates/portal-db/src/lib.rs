//! # portal-db
//!
//! Database layer implementing the repository traits of `portal-core`.
//!
//! ## Overview
//!
//! - Connection pool management and SQL migrations (PostgreSQL + PostGIS)
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - PostgreSQL repository implementations
//! - An in-memory store implementing the same traits, for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use portal_db::{create_pool, run_migrations, PgUserRepository, PoolConfig};
//!
//! async fn example(url: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new(url)).await?;
//!     run_migrations(&pool, "./migrations").await?;
//!     let user_repo = PgUserRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryDatabase;
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{PgAuditLogRepository, PgProfileRepository, PgUserRepository};
