//! Key queries
//!
//! Key selection is always earliest-expiring-first: expiring keys sort
//! before never-expiring ones, ties broken by insertion order. Deletes are
//! conditioned on the key's identity at selection time so a concurrent
//! claim of the same last key can never delete a different row; the loser
//! sees zero rows affected and reports "no keys found".

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use keybot_core::{DomainError, GameId, GuildId, KeyId, MemberId};

use crate::models::KeyModel;

use super::error::{map_db_error, map_unique_violation};
use super::RepoResult;

const KEY_COLUMNS: &str = "id, game_id, platform, key, creator_id, expiration";

/// Whether a raw code exists anywhere in the store
pub async fn code_exists(conn: &mut SqliteConnection, code: &str) -> RepoResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM keys WHERE key = ?)")
        .bind(code)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_db_error)
}

/// Insert a new key
///
/// The UNIQUE constraint on the code column enforces global uniqueness;
/// a violation surfaces as `DomainError::DuplicateKey`.
pub async fn insert(
    conn: &mut SqliteConnection,
    game_id: GameId,
    platform: &str,
    code: &str,
    creator_id: MemberId,
    expiration: Option<DateTime<Utc>>,
) -> RepoResult<KeyModel> {
    let result = sqlx::query(
        r"
        INSERT INTO keys (game_id, platform, key, creator_id, expiration)
        VALUES (?, ?, ?, ?, ?)
        ",
    )
    .bind(game_id.into_inner())
    .bind(platform)
    .bind(code)
    .bind(creator_id.into_inner())
    .bind(expiration)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_unique_violation(e, || DomainError::DuplicateKey))?;

    debug!(
        game_id = game_id.into_inner(),
        platform, "key added to inventory"
    );

    Ok(KeyModel {
        id: result.last_insert_rowid(),
        game_id: game_id.into_inner(),
        platform: platform.to_string(),
        key: code.to_string(),
        creator_id: creator_id.into_inner(),
        expiration,
    })
}

/// Select the next claimable key for (game, platform) visible to a guild:
/// keys whose creator shares with that guild, earliest-expiring first
pub async fn find_claimable(
    conn: &mut SqliteConnection,
    game_name: &str,
    platform: &str,
    guild_id: GuildId,
) -> RepoResult<Option<KeyModel>> {
    sqlx::query_as::<_, KeyModel>(&format!(
        r"
        SELECT k.{KEY_COLUMNS}
        FROM keys k
        JOIN games g ON g.id = k.game_id
        WHERE g.name = ?
          AND k.platform = ?
          AND EXISTS (
              SELECT 1 FROM guild_shares s
              WHERE s.member_id = k.creator_id AND s.guild_id = ?
          )
        ORDER BY k.expiration IS NULL, k.expiration ASC, k.id ASC
        LIMIT 1
        "
    ))
    .bind(game_name)
    .bind(platform)
    .bind(guild_id.into_inner())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)
}

/// Select a member's own key for (game, platform), earliest-expiring first
pub async fn find_owned(
    conn: &mut SqliteConnection,
    game_name: &str,
    platform: &str,
    creator_id: MemberId,
) -> RepoResult<Option<KeyModel>> {
    sqlx::query_as::<_, KeyModel>(&format!(
        r"
        SELECT k.{KEY_COLUMNS}
        FROM keys k
        JOIN games g ON g.id = k.game_id
        WHERE g.name = ?
          AND k.platform = ?
          AND k.creator_id = ?
        ORDER BY k.expiration IS NULL, k.expiration ASC, k.id ASC
        LIMIT 1
        "
    ))
    .bind(game_name)
    .bind(platform)
    .bind(creator_id.into_inner())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)
}

/// Delete a key by identity; returns false when the row was already gone
/// (lost race), in which case the caller must treat the key as not found
pub async fn delete_by_id(conn: &mut SqliteConnection, key_id: KeyId) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM keys WHERE id = ?")
        .bind(key_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(result.rows_affected() > 0)
}

/// Set the expiration on every key of a game for one platform; returns
/// the number of keys updated
pub async fn bulk_set_expiration(
    conn: &mut SqliteConnection,
    game_id: GameId,
    platform: &str,
    expiration: DateTime<Utc>,
) -> RepoResult<u64> {
    let result = sqlx::query("UPDATE keys SET expiration = ? WHERE game_id = ? AND platform = ?")
        .bind(expiration)
        .bind(game_id.into_inner())
        .bind(platform)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(result.rows_affected())
}

/// Delete every expired key, then every game left empty; returns
/// (games deleted, keys deleted)
pub async fn purge_expired(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> RepoResult<(u64, u64)> {
    let keys_deleted = sqlx::query("DELETE FROM keys WHERE expiration IS NOT NULL AND expiration < ?")
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?
        .rows_affected();

    let games_deleted = sqlx::query(
        "DELETE FROM games WHERE NOT EXISTS (SELECT 1 FROM keys WHERE keys.game_id = games.id)",
    )
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?
    .rows_affected();

    debug!(keys_deleted, games_deleted, "expired keys purged");
    Ok((games_deleted, keys_deleted))
}
