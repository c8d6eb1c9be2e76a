//! Repository query functions
//!
//! Organized per entity. Mutating functions take `&mut SqliteConnection`
//! so claim/remove flows can compose several steps inside one transaction
//! owned by the caller; the search engine reads straight from the pool.

pub mod error;
pub mod games;
pub mod keys;
pub mod members;
pub mod search;

use keybot_core::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;
