//! Connection pool management

mod sqlite;

pub use sqlite::{create_pool, create_pool_from_env, DatabaseConfig};

/// Re-exported pool type used throughout the workspace
pub use sqlx::SqlitePool;
