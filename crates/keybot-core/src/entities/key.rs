//! Key entity - one redeemable code

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::{GameId, KeyId, MemberId};

/// One redeemable code belonging to exactly one game, added by exactly
/// one member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub id: KeyId,
    pub game_id: GameId,
    /// Canonical platform search name (e.g. "steam")
    pub platform: String,
    /// Raw code string, globally unique across the store
    pub code: String,
    pub creator_id: MemberId,
    /// Absent means the key never expires
    pub expiration: Option<DateTime<Utc>>,
}

impl Key {
    /// Whether the key has already expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|e| e < now)
    }

    /// Whether the key is inside its expiration waiver period: close
    /// enough to expiry that claiming it bypasses the claim cooldown
    pub fn in_waiver_period(&self, waiver_period: Duration, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|e| e - now <= waiver_period)
    }

    /// Whether this key was added by the given member
    pub fn is_owned_by(&self, member_id: MemberId) -> bool {
        self.creator_id == member_id
    }
}

/// The payload handed to the claimant once a key has been removed from
/// inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedKey {
    pub game: String,
    pub platform: String,
    pub code: String,
    pub expiration: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(expiration: Option<DateTime<Utc>>) -> Key {
        Key {
            id: KeyId::new(1),
            game_id: GameId::new(1),
            platform: "steam".to_string(),
            code: "AAAAA-BBBBB-CCCCC".to_string(),
            creator_id: MemberId::new(10),
            expiration,
        }
    }

    #[test]
    fn test_no_expiration_never_expires() {
        let now = Utc::now();
        let k = key(None);
        assert!(!k.is_expired(now));
        assert!(!k.in_waiver_period(Duration::days(7), now));
    }

    #[test]
    fn test_waiver_window() {
        let now = Utc::now();
        let waiver = Duration::days(7);

        let soon = key(Some(now + Duration::hours(1)));
        assert!(soon.in_waiver_period(waiver, now));
        assert!(!soon.is_expired(now));

        let distant = key(Some(now + Duration::days(30)));
        assert!(!distant.in_waiver_period(waiver, now));
    }

    #[test]
    fn test_expired() {
        let now = Utc::now();
        let k = key(Some(now - Duration::hours(1)));
        assert!(k.is_expired(now));
    }

    #[test]
    fn test_ownership() {
        let k = key(None);
        assert!(k.is_owned_by(MemberId::new(10)));
        assert!(!k.is_owned_by(MemberId::new(11)));
    }
}
