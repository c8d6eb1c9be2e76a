//! # keybot-core
//!
//! Domain layer for the game-key pooling bot: entities, value objects,
//! the platform registry, and domain errors.
//! This crate has zero dependencies on infrastructure (database, chat transport, etc.).

pub mod entities;
pub mod error;
pub mod platform;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{ClaimedKey, Game, Key, Member};
pub use error::DomainError;
pub use platform::{Platform, PlatformRegistry};
pub use traits::{DeliveryError, KeyDelivery};
pub use value_objects::{normalize_title, GameFilters, GameId, GuildId, KeyId, MemberId, Page, SortOrder};
