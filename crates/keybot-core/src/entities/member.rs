//! Member entity - a platform user known to the bot

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::{GuildId, MemberId};

/// A chat-platform user
///
/// Members are created lazily on first interaction and never deleted.
/// The guild set is an explicit owned collection; add/remove report
/// whether they changed anything so a redundant share/unshare can be
/// answered as a no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Platform-supplied user id
    pub id: MemberId,
    /// Display name as last seen (may go stale)
    pub name: String,
    /// Time of the last cooldown-starting claim; `None` means eligible now
    pub last_claim: Option<DateTime<Utc>>,
    /// Guilds this member shares their keys with
    pub guilds: Vec<GuildId>,
    pub is_admin: bool,
}

impl Member {
    /// Create a fresh member with no claims and no shared guilds
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            last_claim: None,
            guilds: Vec::new(),
            is_admin: false,
        }
    }

    /// Whether this member shares their keys with the given guild
    pub fn shares_with(&self, guild_id: GuildId) -> bool {
        self.guilds.contains(&guild_id)
    }

    /// Add a guild to the share set; returns false if already present
    pub fn add_guild(&mut self, guild_id: GuildId) -> bool {
        if self.shares_with(guild_id) {
            return false;
        }
        self.guilds.push(guild_id);
        true
    }

    /// Remove a guild from the share set; returns false if not present
    pub fn remove_guild(&mut self, guild_id: GuildId) -> bool {
        let before = self.guilds.len();
        self.guilds.retain(|g| *g != guild_id);
        self.guilds.len() != before
    }

    /// Remaining cooldown given the configured wait time, or `None` when
    /// the member may claim now
    pub fn cooldown_remaining(
        &self,
        wait_time: Duration,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        let last_claim = self.last_claim?;
        let remaining = last_claim + wait_time - now;
        (remaining > Duration::zero()).then_some(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_set_is_idempotent() {
        let mut member = Member::new(MemberId::new(1), "alex");
        let guild = GuildId::new(100);

        assert!(member.add_guild(guild));
        assert!(!member.add_guild(guild));
        assert!(member.shares_with(guild));

        assert!(member.remove_guild(guild));
        assert!(!member.remove_guild(guild));
        assert!(!member.shares_with(guild));
    }

    #[test]
    fn test_cooldown_none_when_never_claimed() {
        let member = Member::new(MemberId::new(1), "alex");
        assert!(member
            .cooldown_remaining(Duration::days(1), Utc::now())
            .is_none());
    }

    #[test]
    fn test_cooldown_remaining_arithmetic() {
        let now = Utc::now();
        let mut member = Member::new(MemberId::new(1), "alex");
        member.last_claim = Some(now - Duration::seconds(1000));

        let remaining = member
            .cooldown_remaining(Duration::seconds(86_400), now)
            .unwrap();
        assert_eq!(remaining, Duration::seconds(85_400));
    }

    #[test]
    fn test_cooldown_elapsed() {
        let now = Utc::now();
        let mut member = Member::new(MemberId::new(1), "alex");
        member.last_claim = Some(now - Duration::days(2));

        assert!(member.cooldown_remaining(Duration::days(1), now).is_none());
    }
}
