//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use std::fmt;

use keybot_core::DomainError;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation (cooldown, missing game, bad key format, ...)
    Domain(DomainError),

    /// Caller lacks the admin flag
    PermissionDenied,

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::PermissionDenied => write!(f, "This command requires the admin flag"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Stable machine-readable code, for structured logs and adapter
    /// message templates
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the adapter should apologize rather than explain
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
            || matches!(self, Self::Domain(e) if e.is_fatal())
    }
}

impl From<DomainError> for ServiceError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_code() {
        let err = ServiceError::from(DomainError::DuplicateKey);
        assert_eq!(err.code(), "DUPLICATE_KEY");
        assert!(!err.is_internal());
    }

    #[test]
    fn test_internal_is_opaque() {
        let err = ServiceError::Internal("connection reset".to_string());
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.is_internal());
    }
}
