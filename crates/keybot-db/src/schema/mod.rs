//! Schema bootstrap and additive migrations
//!
//! The schema is created if missing and then upgraded in place. Upgrades
//! are additive only (new nullable columns) and tracked in a per-entity
//! version ledger (`table_schema`); recording a lower version than the one
//! stored is a fatal configuration error, never applied silently.

use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use keybot_core::DomainError;

use crate::repositories::error::map_db_error;
use crate::repositories::RepoResult;

/// Current schema version per entity
pub const GAMES_VERSION: i64 = 0;
pub const KEYS_VERSION: i64 = 1; // v1 added the nullable expiration column
pub const MEMBERS_VERSION: i64 = 1; // v1 added the is_admin flag
pub const GUILD_SHARES_VERSION: i64 = 0;

const CREATE_TABLES: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        pretty_name TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS ix_games_name ON games (name)",
    r"
    CREATE TABLE IF NOT EXISTS members (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        last_claim TEXT,
        is_admin INTEGER NOT NULL DEFAULT 0
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS keys (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id INTEGER NOT NULL REFERENCES games (id),
        platform TEXT NOT NULL,
        key TEXT NOT NULL UNIQUE,
        creator_id INTEGER NOT NULL REFERENCES members (id),
        expiration TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS ix_keys_game_id ON keys (game_id)",
    "CREATE INDEX IF NOT EXISTS ix_keys_creator_id ON keys (creator_id)",
    r"
    CREATE TABLE IF NOT EXISTS guild_shares (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id INTEGER NOT NULL REFERENCES members (id) ON DELETE CASCADE,
        guild_id INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS ix_guild_shares_member_id ON guild_shares (member_id)",
    r"
    CREATE TABLE IF NOT EXISTS table_schema (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entity TEXT NOT NULL UNIQUE,
        version INTEGER NOT NULL
    )
    ",
];

/// Ensure the schema exists and is at the current version
///
/// Runs inside a single transaction: either every step lands or none do,
/// and a failing upgrade aborts startup.
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &SqlitePool) -> RepoResult<()> {
    let mut tx = pool.begin().await.map_err(map_db_error)?;

    for ddl in CREATE_TABLES {
        sqlx::query(ddl)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
    }

    upgrade_games(&mut tx).await?;
    upgrade_keys(&mut tx).await?;
    upgrade_members(&mut tx).await?;
    upgrade_guild_shares(&mut tx).await?;

    tx.commit().await.map_err(map_db_error)?;
    info!("schema ensured");
    Ok(())
}

async fn upgrade_games(conn: &mut SqliteConnection) -> RepoResult<()> {
    set_table_version(conn, "games", GAMES_VERSION).await
}

async fn upgrade_guild_shares(conn: &mut SqliteConnection) -> RepoResult<()> {
    set_table_version(conn, "guild_shares", GUILD_SHARES_VERSION).await
}

async fn upgrade_keys(conn: &mut SqliteConnection) -> RepoResult<()> {
    // v0 -> v1: nullable expiration column. CREATE IF NOT EXISTS already
    // includes it for fresh databases; only pre-ledger or v0 stores need
    // the column added in place.
    add_column_if_missing(conn, "keys", "expiration", "TEXT").await?;
    set_table_version(conn, "keys", KEYS_VERSION).await
}

async fn upgrade_members(conn: &mut SqliteConnection) -> RepoResult<()> {
    // v0 -> v1: is_admin flag, default off
    add_column_if_missing(conn, "members", "is_admin", "INTEGER NOT NULL DEFAULT 0").await?;
    set_table_version(conn, "members", MEMBERS_VERSION).await
}

/// Get the recorded schema version for an entity, or -1 if unrecorded
pub async fn table_version(conn: &mut SqliteConnection, entity: &str) -> RepoResult<i64> {
    let row = sqlx::query("SELECT version FROM table_schema WHERE entity = ?")
        .bind(entity)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(row.map_or(-1, |r| r.get::<i64, _>("version")))
}

/// Record the schema version for an entity
///
/// Versions only move forward; attempting to record a lower version than
/// the one stored returns `DomainError::SchemaDowngrade`.
pub async fn set_table_version(
    conn: &mut SqliteConnection,
    entity: &str,
    version: i64,
) -> RepoResult<()> {
    let current = table_version(&mut *conn, entity).await?;

    if current < 0 {
        sqlx::query("INSERT INTO table_schema (entity, version) VALUES (?, ?)")
            .bind(entity)
            .bind(version)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        return Ok(());
    }

    if version < current {
        return Err(DomainError::SchemaDowngrade {
            entity: entity.to_string(),
            from: current,
            to: version,
        });
    }

    if version > current {
        sqlx::query("UPDATE table_schema SET version = ? WHERE entity = ?")
            .bind(version)
            .bind(entity)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        debug!(entity, from = current, to = version, "schema upgraded");
    }

    Ok(())
}

/// Whether a table already has the named column
async fn column_exists(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
) -> RepoResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM pragma_table_info(?) WHERE name = ?)",
    )
    .bind(table)
    .bind(column)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)?;

    Ok(exists)
}

/// Add a column to a table unless it is already present
async fn add_column_if_missing(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    column_type: &str,
) -> RepoResult<()> {
    if column_exists(&mut *conn, table, column).await? {
        return Ok(());
    }

    // Table and column names come from compile-time constants, never input.
    let statement = format!("ALTER TABLE {table} ADD COLUMN {column} {column_type}");
    sqlx::query(&statement)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    debug!(table, column, "column added");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool, DatabaseConfig};

    async fn test_pool() -> SqlitePool {
        create_pool(&DatabaseConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = test_pool().await;
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(table_version(&mut conn, "keys").await.unwrap(), KEYS_VERSION);
        assert_eq!(
            table_version(&mut conn, "members").await.unwrap(),
            MEMBERS_VERSION
        );
    }

    #[tokio::test]
    async fn test_downgrade_is_refused() {
        let pool = test_pool().await;
        ensure_schema(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let err = set_table_version(&mut conn, "keys", 0).await.unwrap_err();
        assert!(matches!(err, DomainError::SchemaDowngrade { .. }));
    }

    #[tokio::test]
    async fn test_upgrade_adds_missing_columns() {
        let pool = test_pool().await;

        // Simulate a store created before the expiration column existed
        sqlx::query(
            r"
            CREATE TABLE keys (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL,
                platform TEXT NOT NULL,
                key TEXT NOT NULL UNIQUE,
                creator_id INTEGER NOT NULL
            )
            ",
        )
        .execute(&pool)
        .await
        .unwrap();

        ensure_schema(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(column_exists(&mut conn, "keys", "expiration").await.unwrap());
        assert_eq!(table_version(&mut conn, "keys").await.unwrap(), KEYS_VERSION);
    }

    #[tokio::test]
    async fn test_unrecorded_version_is_negative() {
        let pool = test_pool().await;
        ensure_schema(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(table_version(&mut conn, "no_such_entity").await.unwrap(), -1);
    }
}
