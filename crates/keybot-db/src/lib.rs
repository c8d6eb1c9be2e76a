//! # keybot-db
//!
//! Persistence layer for the key inventory: SQLite via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management
//! - Schema bootstrap with an additive, ledger-versioned migration path
//! - Database models with SQLx `FromRow` derives
//! - Repository query functions
//!
//! Mutating repository functions take `&mut SqliteConnection` so the
//! service layer can compose several steps inside one transaction scope;
//! read-only views (the search engine) run directly against the pool.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keybot_db::pool::{create_pool, DatabaseConfig};
//! use keybot_db::schema;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     schema::ensure_schema(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, SqlitePool};
pub use repositories::RepoResult;
pub use schema::ensure_schema;
