//! Domain entities

mod game;
mod key;
mod member;

pub use game::Game;
pub use key::{ClaimedKey, Key};
pub use member::Member;
