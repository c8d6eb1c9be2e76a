//! Traits (ports) at the seams to out-of-scope collaborators

mod delivery;

pub use delivery::{DeliveryError, DeliveryResult, KeyDelivery};
