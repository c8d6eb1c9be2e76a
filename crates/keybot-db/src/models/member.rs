//! Member and guild-share database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use keybot_core::{GuildId, Member, MemberId};

/// Database model for the members table
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub id: i64,
    pub name: String,
    pub last_claim: Option<DateTime<Utc>>,
    pub is_admin: bool,
}

/// Database model for the guild_shares table
#[derive(Debug, Clone, FromRow)]
pub struct GuildShareModel {
    pub id: i64,
    pub member_id: i64,
    pub guild_id: i64,
}

/// Assemble a domain member from its row plus its loaded share set
pub(crate) fn member_with_guilds(model: MemberModel, guild_ids: Vec<i64>) -> Member {
    Member {
        id: MemberId::new(model.id),
        name: model.name,
        last_claim: model.last_claim,
        guilds: guild_ids.into_iter().map(GuildId::new).collect(),
        is_admin: model.is_admin,
    }
}
