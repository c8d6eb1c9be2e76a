//! Game queries
//!
//! Games are created on first `add` for an unseen normalized title and
//! must never persist with zero keys; every remove/claim/purge path calls
//! `delete_if_empty` after taking a key away.

use sqlx::SqliteConnection;
use tracing::debug;

use keybot_core::{normalize_title, GameId, GuildId, MemberId};

use crate::models::GameModel;

use super::error::map_db_error;
use super::RepoResult;

/// Find a game by its surrogate id
pub async fn find_by_id(
    conn: &mut SqliteConnection,
    game_id: GameId,
) -> RepoResult<Option<GameModel>> {
    sqlx::query_as::<_, GameModel>("SELECT id, name, pretty_name FROM games WHERE id = ?")
        .bind(game_id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)
}

/// Find a game by its normalized search key
pub async fn find_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> RepoResult<Option<GameModel>> {
    sqlx::query_as::<_, GameModel>("SELECT id, name, pretty_name FROM games WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)
}

/// Find a game by search key, but only if it has at least one key whose
/// creator shares with the given guild
///
/// Claim-side lookup: a game stocked only outside the guild's scope must
/// read as not found, not as out of keys, or its existence leaks.
pub async fn find_visible_to_guild(
    conn: &mut SqliteConnection,
    name: &str,
    guild_id: GuildId,
) -> RepoResult<Option<GameModel>> {
    sqlx::query_as::<_, GameModel>(
        r"
        SELECT g.id, g.name, g.pretty_name
        FROM games g
        WHERE g.name = ?
          AND EXISTS (
              SELECT 1
              FROM keys k
              JOIN guild_shares s ON s.member_id = k.creator_id
              WHERE k.game_id = g.id AND s.guild_id = ?
          )
        ",
    )
    .bind(name)
    .bind(guild_id.into_inner())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)
}

/// Find a game by search key, but only if the given member has at least
/// one key in it (remove-side lookup)
pub async fn find_stocked_by(
    conn: &mut SqliteConnection,
    name: &str,
    creator_id: MemberId,
) -> RepoResult<Option<GameModel>> {
    sqlx::query_as::<_, GameModel>(
        r"
        SELECT g.id, g.name, g.pretty_name
        FROM games g
        WHERE g.name = ?
          AND EXISTS (
              SELECT 1 FROM keys k
              WHERE k.game_id = g.id AND k.creator_id = ?
          )
        ",
    )
    .bind(name)
    .bind(creator_id.into_inner())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)
}

/// Look up a game by display title, creating it if unseen
///
/// Lookup is by the normalized search key, so titles differing only by
/// case or punctuation resolve to the same game.
pub async fn get_or_create(
    conn: &mut SqliteConnection,
    pretty_name: &str,
) -> RepoResult<GameModel> {
    let name = normalize_title(pretty_name);

    if let Some(game) = find_by_name(&mut *conn, &name).await? {
        return Ok(game);
    }

    let result = sqlx::query("INSERT INTO games (name, pretty_name) VALUES (?, ?)")
        .bind(&name)
        .bind(pretty_name)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    debug!(name, "game created");

    Ok(GameModel {
        id: result.last_insert_rowid(),
        name,
        pretty_name: pretty_name.to_string(),
    })
}

/// List games whose search key contains the given normalized term
/// (administrative id lookup)
pub async fn find_by_title_substring(
    conn: &mut SqliteConnection,
    term: &str,
) -> RepoResult<Vec<GameModel>> {
    sqlx::query_as::<_, GameModel>(
        r"
        SELECT id, name, pretty_name
        FROM games
        WHERE name LIKE '%' || ? || '%'
        ORDER BY LOWER(pretty_name) ASC
        ",
    )
    .bind(term)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_db_error)
}

/// Update only the display name (rename that keeps the same search key)
pub async fn update_display_name(
    conn: &mut SqliteConnection,
    game_id: GameId,
    pretty_name: &str,
) -> RepoResult<()> {
    sqlx::query("UPDATE games SET pretty_name = ? WHERE id = ?")
        .bind(pretty_name)
        .bind(game_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

/// Update both the search key and display name (in-place rename)
pub async fn update_names(
    conn: &mut SqliteConnection,
    game_id: GameId,
    name: &str,
    pretty_name: &str,
) -> RepoResult<()> {
    sqlx::query("UPDATE games SET name = ?, pretty_name = ? WHERE id = ?")
        .bind(name)
        .bind(pretty_name)
        .bind(game_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

/// Move every key of one game onto another (merge step)
pub async fn reassign_keys(
    conn: &mut SqliteConnection,
    from: GameId,
    to: GameId,
) -> RepoResult<u64> {
    let result = sqlx::query("UPDATE keys SET game_id = ? WHERE game_id = ?")
        .bind(to.into_inner())
        .bind(from.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;
    Ok(result.rows_affected())
}

/// Delete a game and all of its keys (administrative delete)
pub async fn delete(conn: &mut SqliteConnection, game_id: GameId) -> RepoResult<bool> {
    sqlx::query("DELETE FROM keys WHERE game_id = ?")
        .bind(game_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    let result = sqlx::query("DELETE FROM games WHERE id = ?")
        .bind(game_id.into_inner())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(result.rows_affected() > 0)
}

/// Delete a game if it has no keys left; returns whether it was deleted
pub async fn delete_if_empty(conn: &mut SqliteConnection, game_id: GameId) -> RepoResult<bool> {
    let result = sqlx::query(
        r"
        DELETE FROM games
        WHERE id = ?
          AND NOT EXISTS (SELECT 1 FROM keys WHERE keys.game_id = games.id)
        ",
    )
    .bind(game_id.into_inner())
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        debug!(game_id = game_id.into_inner(), "empty game pruned");
    }
    Ok(deleted)
}
