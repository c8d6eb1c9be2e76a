//! # keybot-service
//!
//! Application layer for the game-key pooling bot. Each service owns one
//! slice of behavior (claiming, inventory, browsing, sharing, admin) and
//! composes the store-layer queries into transactional operations. The
//! chat adapter talks only to this crate.

pub mod dto;
pub mod services;

pub use dto::{GameSummary, PageInfo, PlatformKeyCount};
pub use services::{
    AdminService, BrowseService, ClaimService, InventoryService, RenameOutcome, ServiceContext,
    ServiceError, ServiceResult, ShareOutcome, SharingService,
};
