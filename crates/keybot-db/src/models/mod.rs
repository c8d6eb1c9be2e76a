//! Database models
//!
//! Row structs with SQLx `FromRow` derives, plus conversions into the
//! domain entities of `keybot-core`.

mod game;
mod key;
mod member;

pub use game::{GameModel, GamePlatformCountRow};
pub use key::KeyModel;
pub use member::{GuildShareModel, MemberModel};

pub(crate) use member::member_with_guilds;
