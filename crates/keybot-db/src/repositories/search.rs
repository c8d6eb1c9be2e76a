//! Query/Search engine
//!
//! Paginated, filtered, sorted views of games with per-platform key
//! counts. The query runs in two phases inside one statement: a first CTE
//! aggregates (game, platform) counts under the filters, a second picks
//! one page of distinct game ids in the requested order, and the final
//! select re-expands the page back to per-platform rows while preserving
//! the page order. Paginating the join directly would split or drop games
//! whose platforms straddle a page boundary.
//!
//! Optional filters are bound as sentinels (`0` for ids, `''` for
//! strings) so each sort order maps to exactly one prepared statement.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

use keybot_core::{GameFilters, GuildId, MemberId, SortOrder};

use crate::models::GamePlatformCountRow;

use super::error::map_db_error;
use super::RepoResult;

/// ORDER BY strategy for the candidate-id phase
///
/// Operates on the game-level aggregate (game_id, game_name,
/// nearest_expiration). One strategy per sort order; all share the same
/// two-phase query shape.
fn candidate_order_sql(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Title => "LOWER(game_name) ASC",
        SortOrder::Latest => "game_id DESC",
        // Re-rolled on every call: pages of one browse session are
        // independently randomized.
        SortOrder::Random => "RANDOM()",
        SortOrder::Expiration => {
            "nearest_expiration IS NULL, nearest_expiration ASC, LOWER(game_name) ASC"
        }
    }
}

/// One page of games with per-platform key counts
///
/// Rows come back in page order, consecutive rows sharing a game id; the
/// caller groups them into per-game summaries.
#[instrument(skip(pool, filters))]
pub async fn paginated_games(
    pool: &SqlitePool,
    filters: &GameFilters,
    sort: SortOrder,
    limit: u32,
    offset: u32,
) -> RepoResult<Vec<GamePlatformCountRow>> {
    let sql = format!(
        r"
        WITH platform_games AS (
            SELECT
                games.id AS game_id,
                games.pretty_name AS game_name,
                keys.platform AS platform,
                COUNT(keys.id) AS key_count,
                MIN(keys.expiration) AS nearest_expiration
            FROM games
            JOIN keys ON games.id = keys.game_id
            JOIN members ON members.id = keys.creator_id
            WHERE (?1 = 0 OR members.id = ?1)
              AND (?2 = '' OR keys.platform = ?2)
              AND (?3 = '' OR games.name LIKE '%' || ?3 || '%')
              AND (?4 = 0 OR (keys.expiration IS NOT NULL AND keys.expiration > ?5))
              AND (?6 = 0 OR EXISTS (
                  SELECT 1
                  FROM guild_shares
                  WHERE members.id = guild_shares.member_id
                    AND guild_shares.guild_id = ?6
              ))
            GROUP BY games.id, keys.platform
        ),
        page AS (
            SELECT game_id, ord
            FROM (
                SELECT game_id, ROW_NUMBER() OVER (ORDER BY {order_by}) AS ord
                FROM (
                    SELECT
                        game_id,
                        MIN(game_name) AS game_name,
                        MIN(nearest_expiration) AS nearest_expiration
                    FROM platform_games
                    GROUP BY game_id
                )
            )
            ORDER BY ord
            LIMIT ?7 OFFSET ?8
        )
        SELECT
            platform_games.game_id,
            platform_games.game_name,
            platform_games.platform,
            platform_games.key_count,
            platform_games.nearest_expiration
        FROM platform_games
        JOIN page ON platform_games.game_id = page.game_id
        ORDER BY page.ord, platform_games.platform ASC
        ",
        order_by = candidate_order_sql(sort),
    );

    sqlx::query_as::<_, GamePlatformCountRow>(&sql)
        .bind(filters.member_id.map_or(0, MemberId::into_inner))
        .bind(filters.platform.as_deref().unwrap_or(""))
        .bind(filters.search_term.as_deref().unwrap_or(""))
        .bind(i64::from(filters.expiring_only))
        .bind(Utc::now())
        .bind(filters.guild_id.map_or(0, GuildId::into_inner))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

/// Per-platform key counts for a single game, scoped to one guild's
/// visibility
#[instrument(skip(pool))]
pub async fn game_platform_counts(
    pool: &SqlitePool,
    game_id: i64,
    guild_id: GuildId,
) -> RepoResult<Vec<GamePlatformCountRow>> {
    let sql = r"
        SELECT
            games.id AS game_id,
            games.pretty_name AS game_name,
            keys.platform AS platform,
            COUNT(keys.id) AS key_count,
            MIN(keys.expiration) AS nearest_expiration
        FROM games
        JOIN keys ON games.id = keys.game_id
        JOIN members ON members.id = keys.creator_id
        WHERE games.id = ?
          AND EXISTS (
              SELECT 1
              FROM guild_shares
              WHERE members.id = guild_shares.member_id
                AND guild_shares.guild_id = ?
          )
        GROUP BY keys.platform
        ORDER BY keys.platform ASC
    ";

    sqlx::query_as::<_, GamePlatformCountRow>(sql)
        .bind(game_id)
        .bind(guild_id.into_inner())
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

/// Total game count under the same filter predicate, for page headers
///
/// Uses EXISTS rather than counting the join so games with several
/// matching keys are counted once.
#[instrument(skip(pool, filters))]
pub async fn count_games(pool: &SqlitePool, filters: &GameFilters) -> RepoResult<i64> {
    let sql = r"
        SELECT COUNT(1)
        FROM games
        WHERE EXISTS (
            SELECT 1
            FROM keys
            JOIN members ON members.id = keys.creator_id
            WHERE keys.game_id = games.id
              AND (?1 = 0 OR members.id = ?1)
              AND (?2 = '' OR keys.platform = ?2)
              AND (?3 = '' OR games.name LIKE '%' || ?3 || '%')
              AND (?4 = 0 OR (keys.expiration IS NOT NULL AND keys.expiration > ?5))
              AND (?6 = 0 OR EXISTS (
                  SELECT 1
                  FROM guild_shares
                  WHERE guild_shares.member_id = members.id
                    AND guild_shares.guild_id = ?6
              ))
        )
    ";

    sqlx::query_scalar::<_, i64>(sql)
        .bind(filters.member_id.map_or(0, MemberId::into_inner))
        .bind(filters.platform.as_deref().unwrap_or(""))
        .bind(filters.search_term.as_deref().unwrap_or(""))
        .bind(i64::from(filters.expiring_only))
        .bind(Utc::now())
        .bind(filters.guild_id.map_or(0, GuildId::into_inner))
        .fetch_one(pool)
        .await
        .map_err(map_db_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_strategy_per_sort_order() {
        assert_eq!(candidate_order_sql(SortOrder::Title), "LOWER(game_name) ASC");
        assert_eq!(candidate_order_sql(SortOrder::Latest), "game_id DESC");
        assert_eq!(candidate_order_sql(SortOrder::Random), "RANDOM()");
        assert!(candidate_order_sql(SortOrder::Expiration).starts_with("nearest_expiration"));
    }
}
