//! Paging, sorting, and filter value objects for the query engine

use crate::value_objects::{normalize_title, GuildId, MemberId};

/// Sort order for paginated game views
///
/// A closed set: each variant maps to one query-builder strategy in the
/// store layer, all producing the same two-phase (candidate ids, then
/// per-platform expansion) shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Case-insensitive alphabetical by display name
    #[default]
    Title,
    /// Newest games first (game id descending, a proxy for insertion order)
    Latest,
    /// Uniform random, re-rolled on every call. Pages of one browse
    /// session are independently randomized; this is accepted behavior.
    Random,
    /// Ascending by nearest key expiration, ties broken by title.
    /// Games with no expiring keys sort last.
    Expiration,
}

/// Conjunctive, all-optional filters over games and their keys
#[derive(Debug, Clone, Default)]
pub struct GameFilters {
    /// Only games with at least one key whose creator shares with this guild
    pub guild_id: Option<GuildId>,
    /// Only keys created by this member
    pub member_id: Option<MemberId>,
    /// Only keys for this platform (canonical search name)
    pub platform: Option<String>,
    /// Substring match against the normalized search key
    pub search_term: Option<String>,
    /// Only keys with a non-null expiration in the future
    pub expiring_only: bool,
}

impl GameFilters {
    /// Filters scoped to one guild's shared pool
    pub fn for_guild(guild_id: GuildId) -> Self {
        Self {
            guild_id: Some(guild_id),
            ..Self::default()
        }
    }

    /// Filters scoped to one member's own keys
    pub fn for_member(member_id: MemberId) -> Self {
        Self {
            member_id: Some(member_id),
            ..Self::default()
        }
    }

    /// Restrict to a platform by its canonical search name
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Restrict to titles matching a search term (normalized before matching)
    pub fn with_search_term(mut self, term: &str) -> Self {
        self.search_term = Some(normalize_title(term));
        self
    }

    /// Restrict to keys that expire in the future
    pub fn expiring(mut self) -> Self {
        self.expiring_only = true;
        self
    }
}

/// A 1-based page number
///
/// The core assumes page >= 1; values below are clamped. Rejecting
/// nonsense input with a message is the adapter's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(u32);

impl Page {
    pub fn new(number: u32) -> Self {
        Self(number.max(1))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Row offset of this page given a page size
    pub fn offset(self, per_page: u32) -> u32 {
        (self.0 - 1) * per_page
    }
}

impl Default for Page {
    fn default() -> Self {
        Self(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps_to_one() {
        assert_eq!(Page::new(0).number(), 1);
        assert_eq!(Page::new(1).number(), 1);
        assert_eq!(Page::new(3).number(), 3);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(1).offset(20), 0);
        assert_eq!(Page::new(3).offset(20), 40);
    }

    #[test]
    fn test_search_term_is_normalized() {
        let filters = GameFilters::default().with_search_term("Half-Life");
        assert_eq!(filters.search_term.as_deref(), Some("half_life"));
    }

    #[test]
    fn test_guild_scope() {
        let filters = GameFilters::for_guild(GuildId::new(9)).expiring();
        assert_eq!(filters.guild_id, Some(GuildId::new(9)));
        assert!(filters.expiring_only);
        assert!(filters.member_id.is_none());
    }
}
