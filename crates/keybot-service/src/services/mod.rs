//! Service layer
//!
//! Stateless service structs borrowing a shared [`ServiceContext`]. Each
//! operation opens its own transaction scope where it mutates, so a chat
//! adapter can fire commands concurrently against one context.

pub mod admin;
pub mod browse;
pub mod claim;
pub mod context;
pub mod error;
pub mod inventory;
pub mod sharing;

pub use admin::{AdminService, RenameOutcome};
pub use browse::BrowseService;
pub use claim::ClaimService;
pub use context::ServiceContext;
pub use error::{ServiceError, ServiceResult};
pub use inventory::InventoryService;
pub use sharing::{ShareOutcome, SharingService};
