//! Admin service
//!
//! Curation operations on the whole store: id lookup, rename/merge, bulk
//! expiration, purging expired keys, and deleting a game outright. The
//! adapter gates these behind `require_admin`.

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{info, instrument};

use keybot_core::{normalize_title, DomainError, Game, GameId, MemberId};
use keybot_db::repositories::{games, keys, members};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Expiration dates are entered as e.g. "Dec 10 2029"
const EXPIRATION_DATE_FORMAT: &str = "%b %d %Y";

/// Outcome of a rename, so the adapter can describe what actually happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// New title normalizes to the same search key; only the display
    /// name changed
    DisplayNameUpdated,
    /// Search key and display name both updated in place
    Renamed,
    /// New title collided with another game; keys moved onto it and the
    /// source game was deleted
    Merged { into: GameId, keys_moved: u64 },
}

/// Admin service
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Error unless the member carries the admin flag
    #[instrument(skip(self))]
    pub async fn require_admin(&self, member_id: MemberId) -> ServiceResult<()> {
        let mut conn = self.ctx.pool().acquire().await?;
        if members::is_admin(&mut *conn, member_id).await? {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied)
        }
    }

    /// Grant or revoke the admin flag
    #[instrument(skip(self))]
    pub async fn set_admin(&self, member_id: MemberId, admin: bool) -> ServiceResult<()> {
        let mut conn = self.ctx.pool().acquire().await?;
        members::find_by_id(&mut *conn, member_id)
            .await?
            .ok_or(DomainError::MemberNotFound(member_id))?;
        members::set_admin(&mut *conn, member_id, admin).await?;
        Ok(())
    }

    /// List games whose search key contains the given term, with ids
    ///
    /// Rename and bulk-expire address games by id; this is how an admin
    /// finds the id.
    #[instrument(skip(self))]
    pub async fn game_ids(&self, term: &str) -> ServiceResult<Vec<Game>> {
        if !term.chars().any(char::is_alphanumeric) {
            return Err(DomainError::BlankSearchTerm.into());
        }
        let term = normalize_title(term);

        let mut conn = self.ctx.pool().acquire().await?;
        let models = games::find_by_title_substring(&mut *conn, &term).await?;
        Ok(models.into_iter().map(Game::from).collect())
    }

    /// Rename a game, merging it into an existing game when the new
    /// title's search key is already taken
    #[instrument(skip(self))]
    pub async fn rename_game(
        &self,
        game_id: GameId,
        new_title: &str,
    ) -> ServiceResult<RenameOutcome> {
        let name = normalize_title(new_title);
        if name.is_empty() {
            return Err(DomainError::BlankSearchTerm.into());
        }

        let mut tx = self.ctx.pool().begin().await?;

        let game = games::find_by_id(&mut *tx, game_id)
            .await?
            .map(Game::from)
            .ok_or_else(|| DomainError::GameNotFound(game_id.to_string()))?;

        let outcome = if game.matches_title(new_title) {
            games::update_display_name(&mut *tx, game_id, new_title).await?;
            RenameOutcome::DisplayNameUpdated
        } else if let Some(existing) = games::find_by_name(&mut *tx, &name).await? {
            let into = GameId::new(existing.id);
            let keys_moved = games::reassign_keys(&mut *tx, game_id, into).await?;
            games::delete_if_empty(&mut *tx, game_id).await?;
            RenameOutcome::Merged { into, keys_moved }
        } else {
            games::update_names(&mut *tx, game_id, &name, new_title).await?;
            RenameOutcome::Renamed
        };

        tx.commit().await?;

        info!(game_id = game_id.into_inner(), ?outcome, "game renamed");
        Ok(outcome)
    }

    /// Set the expiration on every key of (game, platform)
    ///
    /// The date is parsed from the "Mon DD YYYY" form and must lie in the
    /// future; keys already claimed are unaffected. Returns the number of
    /// keys updated.
    #[instrument(skip(self))]
    pub async fn bulk_expire(
        &self,
        game_id: GameId,
        platform_name: &str,
        date: &str,
    ) -> ServiceResult<u64> {
        let platform = self
            .ctx
            .registry()
            .resolve(platform_name)
            .ok_or_else(|| DomainError::PlatformNotFound(platform_name.to_string()))?;

        let parsed = NaiveDate::parse_from_str(date.trim(), EXPIRATION_DATE_FORMAT)
            .map_err(|_| DomainError::InvalidExpirationDate(date.to_string()))?;
        if parsed <= Utc::now().date_naive() {
            return Err(DomainError::ExpirationNotFuture(parsed).into());
        }
        let expiration = parsed.and_time(NaiveTime::MIN).and_utc();

        let mut tx = self.ctx.pool().begin().await?;
        games::find_by_id(&mut *tx, game_id)
            .await?
            .ok_or_else(|| DomainError::GameNotFound(game_id.to_string()))?;
        let updated =
            keys::bulk_set_expiration(&mut *tx, game_id, platform.search_name(), expiration)
                .await?;
        tx.commit().await?;

        info!(
            game_id = game_id.into_inner(),
            platform = platform.search_name(),
            updated,
            "bulk expiration set"
        );
        Ok(updated)
    }

    /// Delete every expired key and prune games left empty; returns
    /// (games deleted, keys deleted)
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> ServiceResult<(u64, u64)> {
        let mut tx = self.ctx.pool().begin().await?;
        let (games_deleted, keys_deleted) = keys::purge_expired(&mut *tx, Utc::now()).await?;
        tx.commit().await?;

        info!(games_deleted, keys_deleted, "expired keys purged");
        Ok((games_deleted, keys_deleted))
    }

    /// Delete a game and all of its keys
    #[instrument(skip(self))]
    pub async fn delete_game(&self, game_id: GameId) -> ServiceResult<()> {
        let mut tx = self.ctx.pool().begin().await?;
        let deleted = games::delete(&mut *tx, game_id).await?;
        tx.commit().await?;

        if !deleted {
            return Err(DomainError::GameNotFound(game_id.to_string()).into());
        }
        info!(game_id = game_id.into_inner(), "game deleted");
        Ok(())
    }
}
