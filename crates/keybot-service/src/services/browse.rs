//! Browse service
//!
//! Read-only paginated views over the pool: browse, search, per-platform,
//! latest, expiring, random, and a member's own stock. All views share
//! one pipeline (filters + sort + page) and run against the pool without
//! a transaction.

use tracing::instrument;

use keybot_core::{normalize_title, DomainError, GameFilters, GuildId, MemberId, Page, SortOrder};
use keybot_db::repositories::{games, search};

use crate::dto::{GameSummary, PageInfo};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Browse service
pub struct BrowseService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BrowseService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Alphabetical listing of the guild's shared pool
    #[instrument(skip(self), fields(guild_id = guild_id.into_inner()))]
    pub async fn browse(
        &self,
        guild_id: GuildId,
        page: Page,
    ) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        self.paged(GameFilters::for_guild(guild_id), SortOrder::Title, page)
            .await
    }

    /// Title search within the guild's shared pool
    ///
    /// The term is normalized the same way titles are, so punctuation and
    /// case differences still match. A blank term is rejected rather than
    /// silently listing everything.
    #[instrument(skip(self), fields(guild_id = guild_id.into_inner()))]
    pub async fn search(
        &self,
        guild_id: GuildId,
        term: &str,
        page: Page,
    ) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        // A term with no word characters normalizes to underscores, which
        // LIKE treats as match-anything wildcards.
        if !term.chars().any(char::is_alphanumeric) {
            return Err(DomainError::BlankSearchTerm.into());
        }
        let filters = GameFilters::for_guild(guild_id).with_search_term(term);
        self.paged(filters, SortOrder::Title, page).await
    }

    /// Games with keys for one platform
    #[instrument(skip(self), fields(guild_id = guild_id.into_inner()))]
    pub async fn by_platform(
        &self,
        guild_id: GuildId,
        platform_name: &str,
        page: Page,
    ) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        let platform = self
            .ctx
            .registry()
            .resolve(platform_name)
            .ok_or_else(|| DomainError::PlatformNotFound(platform_name.to_string()))?;

        self.paged(
            GameFilters::for_guild(guild_id).with_platform(platform.search_name()),
            SortOrder::Title,
            page,
        )
        .await
    }

    /// Most recently added games first
    #[instrument(skip(self), fields(guild_id = guild_id.into_inner()))]
    pub async fn latest(
        &self,
        guild_id: GuildId,
        page: Page,
    ) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        self.paged(GameFilters::for_guild(guild_id), SortOrder::Latest, page)
            .await
    }

    /// Games whose keys expire soonest
    #[instrument(skip(self), fields(guild_id = guild_id.into_inner()))]
    pub async fn expiring(
        &self,
        guild_id: GuildId,
        page: Page,
    ) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        self.paged(
            GameFilters::for_guild(guild_id).expiring(),
            SortOrder::Expiration,
            page,
        )
        .await
    }

    /// A page-sized random sample of the pool
    ///
    /// Re-rolled on every call; there is no stable page two.
    #[instrument(skip(self), fields(guild_id = guild_id.into_inner()))]
    pub async fn random(&self, guild_id: GuildId) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        self.paged(
            GameFilters::for_guild(guild_id),
            SortOrder::Random,
            Page::default(),
        )
        .await
    }

    /// The caller's own stock, regardless of guild shares
    #[instrument(skip(self), fields(member_id = member_id.into_inner()))]
    pub async fn my_keys(
        &self,
        member_id: MemberId,
        page: Page,
    ) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        self.paged(GameFilters::for_member(member_id), SortOrder::Title, page)
            .await
    }

    /// Per-platform availability for a single game
    ///
    /// Not-found covers both an unknown title and a game none of the
    /// guild's sharers currently stock; the distinction would leak other
    /// guilds' inventories.
    #[instrument(skip(self), fields(guild_id = guild_id.into_inner()))]
    pub async fn game_keys(
        &self,
        guild_id: GuildId,
        title: &str,
    ) -> ServiceResult<GameSummary> {
        let name = normalize_title(title);
        if name.is_empty() {
            return Err(DomainError::BlankSearchTerm.into());
        }

        let not_found = || DomainError::GameNotFound(title.to_string());

        let mut conn = self.ctx.pool().acquire().await?;
        let game = games::find_by_name(&mut *conn, &name)
            .await?
            .ok_or_else(not_found)?;
        drop(conn);

        let rows = search::game_platform_counts(self.ctx.pool(), game.id, guild_id).await?;
        GameSummary::from_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| not_found().into())
    }

    async fn paged(
        &self,
        filters: GameFilters,
        sort: SortOrder,
        page: Page,
    ) -> ServiceResult<(Vec<GameSummary>, PageInfo)> {
        let per_page = self.ctx.page_size();
        let rows = search::paginated_games(
            self.ctx.pool(),
            &filters,
            sort,
            per_page,
            page.offset(per_page),
        )
        .await?;
        let total = search::count_games(self.ctx.pool(), &filters).await?;

        Ok((
            GameSummary::from_rows(rows),
            PageInfo::new(page.number(), per_page, total),
        ))
    }
}
