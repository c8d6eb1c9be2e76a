//! Member and guild-share queries
//!
//! Members are created lazily on first interaction, keyed by the
//! platform-supplied user id. The display name is recorded at creation
//! and allowed to go stale.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use keybot_core::{GuildId, Member, MemberId};

use crate::models::{member_with_guilds, MemberModel};

use super::error::map_db_error;
use super::RepoResult;

/// Load a member with their guild-share set
pub async fn find_by_id(
    conn: &mut SqliteConnection,
    member_id: MemberId,
) -> RepoResult<Option<Member>> {
    let model = sqlx::query_as::<_, MemberModel>(
        "SELECT id, name, last_claim, is_admin FROM members WHERE id = ?",
    )
    .bind(member_id.into_inner())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?;

    match model {
        Some(model) => {
            let guild_ids = load_guild_ids(&mut *conn, member_id).await?;
            Ok(Some(member_with_guilds(model, guild_ids)))
        }
        None => Ok(None),
    }
}

/// Get a member by platform id, creating the row on first interaction
pub async fn get_or_create(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    name: &str,
) -> RepoResult<Member> {
    if let Some(member) = find_by_id(&mut *conn, member_id).await? {
        return Ok(member);
    }

    sqlx::query("INSERT INTO members (id, name) VALUES (?, ?)")
        .bind(member_id.into_inner())
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    debug!(member_id = member_id.into_inner(), "member created");
    Ok(Member::new(member_id, name))
}

/// Record the start of a claim cooldown
pub async fn update_last_claim(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    when: DateTime<Utc>,
) -> RepoResult<()> {
    sqlx::query("UPDATE members SET last_claim = ? WHERE id = ?")
        .bind(when)
        .bind(member_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

/// Guild ids this member shares their keys with
pub async fn load_guild_ids(
    conn: &mut SqliteConnection,
    member_id: MemberId,
) -> RepoResult<Vec<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT guild_id FROM guild_shares WHERE member_id = ?")
        .bind(member_id.into_inner())
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)
}

/// Add a guild to a member's share set; returns false if already present
pub async fn add_share(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    guild_id: GuildId,
) -> RepoResult<bool> {
    if share_exists(&mut *conn, member_id, guild_id).await? {
        return Ok(false);
    }

    sqlx::query("INSERT INTO guild_shares (member_id, guild_id) VALUES (?, ?)")
        .bind(member_id.into_inner())
        .bind(guild_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(true)
}

/// Remove a guild from a member's share set; returns false if not present
pub async fn remove_share(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    guild_id: GuildId,
) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM guild_shares WHERE member_id = ? AND guild_id = ?")
        .bind(member_id.into_inner())
        .bind(guild_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(result.rows_affected() > 0)
}

/// Whether the member shares with the given guild
pub async fn share_exists(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    guild_id: GuildId,
) -> RepoResult<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM guild_shares WHERE member_id = ? AND guild_id = ?)",
    )
    .bind(member_id.into_inner())
    .bind(guild_id.into_inner())
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)
}

/// Whether the member carries the admin flag
pub async fn is_admin(conn: &mut SqliteConnection, member_id: MemberId) -> RepoResult<bool> {
    let flag = sqlx::query_scalar::<_, bool>("SELECT is_admin FROM members WHERE id = ?")
        .bind(member_id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(flag.unwrap_or(false))
}

/// Set or clear the admin flag
pub async fn set_admin(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    admin: bool,
) -> RepoResult<()> {
    sqlx::query("UPDATE members SET is_admin = ? WHERE id = ?")
        .bind(admin)
        .bind(member_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;
    Ok(())
}
