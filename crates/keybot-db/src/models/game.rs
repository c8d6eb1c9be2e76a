//! Game database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use keybot_core::{Game, GameId};

/// Database model for the games table
#[derive(Debug, Clone, FromRow)]
pub struct GameModel {
    pub id: i64,
    pub name: String,
    pub pretty_name: String,
}

impl From<GameModel> for Game {
    fn from(model: GameModel) -> Self {
        Game {
            id: GameId::new(model.id),
            name: model.name,
            pretty_name: model.pretty_name,
        }
    }
}

/// One (game, platform) aggregate row produced by the paginated search
/// query: rows arrive in page order, consecutive rows sharing a game id.
#[derive(Debug, Clone, FromRow)]
pub struct GamePlatformCountRow {
    pub game_id: i64,
    pub game_name: String,
    pub platform: String,
    pub key_count: i64,
    pub nearest_expiration: Option<DateTime<Utc>>,
}
