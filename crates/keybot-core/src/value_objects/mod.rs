//! Value objects - identifier newtypes, title normalization, paging

mod ids;
mod paging;
mod search_key;

pub use ids::{GameId, GuildId, KeyId, MemberId};
pub use paging::{GameFilters, Page, SortOrder};
pub use search_key::normalize_title;
