//! Domain errors - typed outcomes the adapter must branch on
//!
//! The core never constructs user-facing text; these variants carry the
//! context (remaining cooldown, offending platform name, ...) the adapter
//! needs to phrase a response.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::value_objects::MemberId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found
    // =========================================================================
    #[error("game not found: {0}")]
    GameNotFound(String),

    #[error("no {platform} keys for game: {game}")]
    NoKeysForPlatform { game: String, platform: String },

    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("platform not found: {0}")]
    PlatformNotFound(String),

    // =========================================================================
    // Validation
    // =========================================================================
    #[error("code does not match any format for platform {platform}")]
    InvalidKeyFormat { platform: String },

    #[error("code does not match any known platform format")]
    UnrecognizedKeyFormat,

    #[error("search term is blank")]
    BlankSearchTerm,

    #[error("unparseable expiration date: {0}")]
    InvalidExpirationDate(String),

    #[error("expiration date is not in the future: {0}")]
    ExpirationNotFuture(NaiveDate),

    // =========================================================================
    // Conflict
    // =========================================================================
    #[error("key code already exists")]
    DuplicateKey,

    #[error("claim cooldown active: {}s remaining", remaining.num_seconds())]
    CooldownActive { remaining: Duration },

    // =========================================================================
    // Integrity / Infrastructure
    // =========================================================================
    #[error("refusing to downgrade {entity} schema from v{from} to v{to}")]
    SchemaDowngrade { entity: String, from: i64, to: i64 },

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("key delivery failed: {0}")]
    DeliveryFailed(String),
}

impl DomainError {
    /// Get a stable code string for adapter-side branching
    pub fn code(&self) -> &'static str {
        match self {
            Self::GameNotFound(_) => "UNKNOWN_GAME",
            Self::NoKeysForPlatform { .. } => "NO_KEYS_FOR_PLATFORM",
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::PlatformNotFound(_) => "UNKNOWN_PLATFORM",
            Self::InvalidKeyFormat { .. } => "INVALID_KEY_FORMAT",
            Self::UnrecognizedKeyFormat => "UNRECOGNIZED_KEY_FORMAT",
            Self::BlankSearchTerm => "BLANK_SEARCH_TERM",
            Self::InvalidExpirationDate(_) => "INVALID_EXPIRATION_DATE",
            Self::ExpirationNotFuture(_) => "EXPIRATION_NOT_FUTURE",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            Self::SchemaDowngrade { .. } => "SCHEMA_DOWNGRADE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::DeliveryFailed(_) => "DELIVERY_FAILED",
        }
    }

    /// Check if this is a "not found" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GameNotFound(_)
                | Self::NoKeysForPlatform { .. }
                | Self::MemberNotFound(_)
                | Self::PlatformNotFound(_)
        )
    }

    /// Check if this is a validation error (reported before any mutation)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidKeyFormat { .. }
                | Self::UnrecognizedKeyFormat
                | Self::BlankSearchTerm
                | Self::InvalidExpirationDate(_)
                | Self::ExpirationNotFuture(_)
        )
    }

    /// Check if this is a conflict carrying context for the caller
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateKey | Self::CooldownActive { .. })
    }

    /// Check if this is a fatal integrity/infrastructure error that must
    /// not be retried by the core
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SchemaDowngrade { .. } | Self::DatabaseError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::GameNotFound("portal_2".to_string());
        assert_eq!(err.code(), "UNKNOWN_GAME");

        let err = DomainError::CooldownActive {
            remaining: Duration::seconds(120),
        };
        assert_eq!(err.code(), "COOLDOWN_ACTIVE");
        assert!(err.to_string().contains("120s"));
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::GameNotFound(String::new()).is_not_found());
        assert!(DomainError::BlankSearchTerm.is_validation());
        assert!(DomainError::DuplicateKey.is_conflict());
        assert!(DomainError::DatabaseError(String::new()).is_fatal());
        assert!(!DomainError::DuplicateKey.is_not_found());
    }

    #[test]
    fn test_downgrade_display() {
        let err = DomainError::SchemaDowngrade {
            entity: "keys".to_string(),
            from: 1,
            to: 0,
        };
        assert_eq!(
            err.to_string(),
            "refusing to downgrade keys schema from v1 to v0"
        );
    }
}
