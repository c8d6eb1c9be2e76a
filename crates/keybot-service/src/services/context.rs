//! Service context - shared dependency container
//!
//! Holds everything the services need: the connection pool, the platform
//! registry, and the claim/paging policy. Cheap to clone; services borrow
//! it per request.

use std::sync::Arc;

use keybot_common::{AppConfig, ClaimPolicy};
use keybot_core::PlatformRegistry;
use keybot_db::SqlitePool;

/// Shared context passed to all services
#[derive(Clone)]
pub struct ServiceContext {
    pool: SqlitePool,
    registry: Arc<PlatformRegistry>,
    policy: ClaimPolicy,
    page_size: u32,
}

impl ServiceContext {
    pub fn new(
        pool: SqlitePool,
        registry: Arc<PlatformRegistry>,
        policy: ClaimPolicy,
        page_size: u32,
    ) -> Self {
        Self {
            pool,
            registry,
            policy,
            page_size,
        }
    }

    /// Build a context from loaded configuration and an opened pool,
    /// with the standard platform registry
    pub fn from_config(pool: SqlitePool, config: &AppConfig) -> Self {
        Self::new(
            pool,
            Arc::new(PlatformRegistry::standard()),
            config.claim,
            config.page_size,
        )
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn policy(&self) -> ClaimPolicy {
        self.policy
    }

    /// Games per page in paginated listings
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
