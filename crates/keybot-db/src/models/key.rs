//! Key database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use keybot_core::{GameId, Key, KeyId, MemberId};

/// Database model for the keys table
#[derive(Debug, Clone, FromRow)]
pub struct KeyModel {
    pub id: i64,
    pub game_id: i64,
    pub platform: String,
    pub key: String,
    pub creator_id: i64,
    pub expiration: Option<DateTime<Utc>>,
}

impl From<KeyModel> for Key {
    fn from(model: KeyModel) -> Self {
        Key {
            id: KeyId::new(model.id),
            game_id: GameId::new(model.game_id),
            platform: model.platform,
            code: model.key,
            creator_id: MemberId::new(model.creator_id),
            expiration: model.expiration,
        }
    }
}
