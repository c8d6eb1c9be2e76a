//! Game entity - a distinct title holding one or more keys

use crate::value_objects::{normalize_title, GameId};

/// A distinct game title
///
/// A game with zero keys must not persist; the store prunes empty games
/// as part of every operation that removes keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    /// Normalized search key (lowercased, non-word runs collapsed to `_`)
    pub name: String,
    /// Display name with original casing and spacing
    pub pretty_name: String,
}

impl Game {
    /// Whether a new title collides with this game's existing search key
    /// (i.e. renaming to it is a pure display-name update)
    pub fn matches_title(&self, title: &str) -> bool {
        self.name == normalize_title(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_title_ignores_punctuation() {
        let game = Game {
            id: GameId::new(1),
            name: normalize_title("Portal 2"),
            pretty_name: "Portal 2".to_string(),
        };
        assert!(game.matches_title("PORTAL-2"));
        assert!(!game.matches_title("Portal 3"));
    }
}
