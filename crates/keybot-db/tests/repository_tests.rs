//! Integration tests for keybot-db repositories
//!
//! All tests run against a fresh in-memory SQLite database, so they need
//! no external services.

use chrono::{Duration, Utc};

use keybot_core::{DomainError, GameFilters, GameId, GuildId, KeyId, MemberId, SortOrder};
use keybot_db::pool::DatabaseConfig;
use keybot_db::repositories::{games, keys, members, search};
use keybot_db::{create_pool, ensure_schema, SqlitePool};

const GUILD: GuildId = GuildId::new(100);
const ALICE: MemberId = MemberId::new(1);
const BOB: MemberId = MemberId::new(2);

async fn test_pool() -> SqlitePool {
    let pool = create_pool(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory pool");
    ensure_schema(&pool).await.expect("schema bootstrap");
    pool
}

/// Create a member sharing with the test guild
async fn seed_sharer(pool: &SqlitePool, member_id: MemberId, name: &str) {
    let mut conn = pool.acquire().await.unwrap();
    members::get_or_create(&mut conn, member_id, name).await.unwrap();
    members::add_share(&mut conn, member_id, GUILD).await.unwrap();
}

/// Add a key, creating the game as needed; returns (game id, key id)
async fn seed_key(
    pool: &SqlitePool,
    title: &str,
    platform: &str,
    code: &str,
    creator: MemberId,
    expiration: Option<chrono::DateTime<Utc>>,
) -> (GameId, KeyId) {
    let mut conn = pool.acquire().await.unwrap();
    let game = games::get_or_create(&mut conn, title).await.unwrap();
    let key = keys::insert(
        &mut conn,
        GameId::new(game.id),
        platform,
        code,
        creator,
        expiration,
    )
    .await
    .unwrap();
    (GameId::new(game.id), KeyId::new(key.id))
}

#[tokio::test]
async fn test_duplicate_code_is_rejected() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;
    seed_key(&pool, "Portal 2", "steam", "AAAAA-BBBBB-CCCCC", ALICE, None).await;

    let mut conn = pool.acquire().await.unwrap();
    let game = games::get_or_create(&mut conn, "Some Other Game").await.unwrap();
    let err = keys::insert(
        &mut conn,
        GameId::new(game.id),
        "gog",
        "AAAAA-BBBBB-CCCCC",
        ALICE,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DomainError::DuplicateKey));
}

#[tokio::test]
async fn test_claimable_selection_is_earliest_expiring_first() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;

    let now = Utc::now();
    seed_key(&pool, "Portal 2", "steam", "CODE1CODE1CODE1CODE1CODE1", ALICE, None).await;
    let (_, soon) = seed_key(
        &pool,
        "Portal 2",
        "steam",
        "CODE2CODE2CODE2CODE2CODE2",
        ALICE,
        Some(now + Duration::days(3)),
    )
    .await;
    seed_key(
        &pool,
        "Portal 2",
        "steam",
        "CODE3CODE3CODE3CODE3CODE3",
        ALICE,
        Some(now + Duration::days(30)),
    )
    .await;

    let mut conn = pool.acquire().await.unwrap();
    let selected = keys::find_claimable(&mut conn, "portal_2", "steam", GUILD)
        .await
        .unwrap()
        .expect("a key should be claimable");
    assert_eq!(KeyId::new(selected.id), soon);
}

#[tokio::test]
async fn test_claimable_scope_excludes_non_sharers() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;

    // Bob exists but never shared with the guild.
    {
        let mut conn = pool.acquire().await.unwrap();
        members::get_or_create(&mut conn, BOB, "bob").await.unwrap();
    }
    seed_key(&pool, "Fez", "steam", "FEZBBFEZBBFEZBBFEZBBFEZBB", BOB, None).await;

    let mut conn = pool.acquire().await.unwrap();
    let selected = keys::find_claimable(&mut conn, "fez", "steam", GUILD)
        .await
        .unwrap();
    assert!(selected.is_none());

    // The creator can still see it through the owned scope.
    let owned = keys::find_owned(&mut conn, "fez", "steam", BOB).await.unwrap();
    assert!(owned.is_some());
}

#[tokio::test]
async fn test_scoped_game_lookups() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;
    {
        let mut conn = pool.acquire().await.unwrap();
        members::get_or_create(&mut conn, BOB, "bob").await.unwrap();
    }

    // Alice's game is guild-visible; Bob's (never shared) is not.
    seed_key(&pool, "Portal 2", "steam", "VIS1AVIS1AVIS1AVIS1AVIS1A", ALICE, None).await;
    seed_key(&pool, "Outer Wilds", "steam", "HID1AHID1AHID1AHID1AHID1A", BOB, None).await;

    let mut conn = pool.acquire().await.unwrap();
    assert!(games::find_visible_to_guild(&mut conn, "portal_2", GUILD)
        .await
        .unwrap()
        .is_some());
    assert!(games::find_visible_to_guild(&mut conn, "outer_wilds", GUILD)
        .await
        .unwrap()
        .is_none());

    // Creator scope sees only the member's own stock.
    assert!(games::find_stocked_by(&mut conn, "outer_wilds", BOB)
        .await
        .unwrap()
        .is_some());
    assert!(games::find_stocked_by(&mut conn, "portal_2", BOB)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_conditioned_delete_reports_lost_race() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;
    let (game_id, key_id) =
        seed_key(&pool, "Celeste", "steam", "CELESCELESCELESCELESCELES", ALICE, None).await;

    let mut conn = pool.acquire().await.unwrap();
    assert!(keys::delete_by_id(&mut conn, key_id).await.unwrap());
    // Second delete of the same identity affects zero rows.
    assert!(!keys::delete_by_id(&mut conn, key_id).await.unwrap());

    assert!(games::delete_if_empty(&mut conn, game_id).await.unwrap());
    assert!(games::find_by_id(&mut conn, game_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_pagination_never_splits_a_game() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;

    // Five games, two platforms each, paged two games at a time.
    for (i, title) in ["Axiom Verge", "Braid", "Celeste", "Dredge", "Eastward"]
        .iter()
        .enumerate()
    {
        seed_key(&pool, title, "steam", &format!("S{i}S{i}S{i}S{i}S{i}S{i}S{i}S{i}S{i}"), ALICE, None).await;
        seed_key(&pool, title, "gog", &format!("G{i}G{i}G{i}G{i}G{i}G{i}G{i}G{i}G{i}"), ALICE, None).await;
    }

    let filters = GameFilters::for_guild(GUILD);
    let mut seen: Vec<String> = Vec::new();

    for page in 0..3 {
        let rows = search::paginated_games(&pool, &filters, SortOrder::Title, 2, page * 2)
            .await
            .unwrap();

        let mut page_games: Vec<String> = Vec::new();
        for row in &rows {
            if page_games.last() != Some(&row.game_name) {
                page_games.push(row.game_name.clone());
            }
        }
        // Full page except the last, and both platforms per game.
        assert_eq!(page_games.len(), if page < 2 { 2 } else { 1 });
        assert_eq!(rows.len(), page_games.len() * 2);
        seen.extend(page_games);
    }

    assert_eq!(
        seen,
        vec!["Axiom Verge", "Braid", "Celeste", "Dredge", "Eastward"]
    );

    let total = search::count_games(&pool, &filters).await.unwrap();
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_count_counts_each_game_once() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;
    seed_sharer(&pool, BOB, "bob").await;

    // One game, three keys across two platforms and two creators.
    seed_key(&pool, "Hades", "steam", "HAD1AHAD1AHAD1AHAD1AHAD1A", ALICE, None).await;
    seed_key(&pool, "Hades", "steam", "HAD2AHAD2AHAD2AHAD2AHAD2A", BOB, None).await;
    seed_key(&pool, "Hades", "gog", "HAD3AHAD3AHAD3AHAD3A", ALICE, None).await;

    let total = search::count_games(&pool, &GameFilters::for_guild(GUILD))
        .await
        .unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_search_filters_compose() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;

    let now = Utc::now();
    seed_key(&pool, "Half-Life", "steam", "HL1AAHL1AAHL1AAHL1AAHL1AA", ALICE, None).await;
    seed_key(
        &pool,
        "Half-Life 2",
        "steam",
        "HL2AAHL2AAHL2AAHL2AAHL2AA",
        ALICE,
        Some(now + Duration::days(2)),
    )
    .await;
    seed_key(&pool, "Quake", "gog", "QUAKEQUAKEQUAKEQUA", ALICE, None).await;

    // Normalized substring search matches both Half-Life entries.
    let filters = GameFilters::for_guild(GUILD).with_search_term("half life");
    assert_eq!(search::count_games(&pool, &filters).await.unwrap(), 2);

    // Platform filter.
    let filters = GameFilters::for_guild(GUILD).with_platform("gog");
    assert_eq!(search::count_games(&pool, &filters).await.unwrap(), 1);

    // Expiring-only excludes never-expiring keys.
    let filters = GameFilters::for_guild(GUILD).expiring();
    let rows = search::paginated_games(&pool, &filters, SortOrder::Expiration, 10, 0)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].game_name, "Half-Life 2");
}

#[tokio::test]
async fn test_member_scope_ignores_guild_shares() {
    let pool = test_pool().await;
    // Bob stocks a key but shares with no guild.
    {
        let mut conn = pool.acquire().await.unwrap();
        members::get_or_create(&mut conn, BOB, "bob").await.unwrap();
    }
    seed_key(&pool, "Rain World", "steam", "RAINWRAINWRAINWRAINWRAINW", BOB, None).await;

    let filters = GameFilters::for_member(BOB);
    assert_eq!(search::count_games(&pool, &filters).await.unwrap(), 1);

    // But the guild view must not see it.
    let filters = GameFilters::for_guild(GUILD);
    assert_eq!(search::count_games(&pool, &filters).await.unwrap(), 0);
}

#[tokio::test]
async fn test_purge_expired_prunes_empty_games() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;

    let now = Utc::now();
    let (dead_game, _) = seed_key(
        &pool,
        "Expired Quest",
        "steam",
        "EXPAAEXPAAEXPAAEXPAAEXPAA",
        ALICE,
        Some(now - Duration::days(1)),
    )
    .await;
    seed_key(&pool, "Evergreen", "steam", "EVRGNEVRGNEVRGNEVRGNEVRGN", ALICE, None).await;

    let mut conn = pool.acquire().await.unwrap();
    let (games_deleted, keys_deleted) = keys::purge_expired(&mut conn, now).await.unwrap();
    assert_eq!((games_deleted, keys_deleted), (1, 1));
    assert!(games::find_by_id(&mut conn, dead_game).await.unwrap().is_none());
    assert!(games::find_by_name(&mut conn, "evergreen").await.unwrap().is_some());
}

#[tokio::test]
async fn test_rename_merge_moves_keys() {
    let pool = test_pool().await;
    seed_sharer(&pool, ALICE, "alice").await;

    let (from, _) = seed_key(&pool, "HalfLife", "steam", "MRG1AMRG1AMRG1AMRG1AMRG1A", ALICE, None).await;
    let (to, _) = seed_key(&pool, "Half-Life", "steam", "MRG2AMRG2AMRG2AMRG2AMRG2A", ALICE, None).await;

    let mut conn = pool.acquire().await.unwrap();
    let moved = games::reassign_keys(&mut conn, from, to).await.unwrap();
    assert_eq!(moved, 1);
    assert!(games::delete_if_empty(&mut conn, from).await.unwrap());

    let survivor = games::find_by_id(&mut conn, to).await.unwrap().unwrap();
    assert_eq!(survivor.pretty_name, "Half-Life");
}
