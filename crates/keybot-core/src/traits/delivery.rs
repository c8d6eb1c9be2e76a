//! Key delivery port
//!
//! A claimed key is sensitive: once delivered it cannot be taken back,
//! and once deleted it cannot be re-delivered. The claim engine calls
//! this trait *inside* its transaction and commits only after delivery
//! succeeds; a delivery failure rolls the whole claim back.

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::ClaimedKey;
use crate::value_objects::MemberId;

/// Failure to hand the claimed key to the claimant (e.g. the private
/// message could not be sent)
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

impl DeliveryError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Result type for delivery operations
pub type DeliveryResult = Result<(), DeliveryError>;

/// Port implemented by the command adapter to privately deliver a
/// claimed key to its recipient
#[async_trait]
pub trait KeyDelivery: Send + Sync {
    async fn deliver(&self, recipient: MemberId, key: &ClaimedKey) -> DeliveryResult;
}
