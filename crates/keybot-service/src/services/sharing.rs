//! Sharing service
//!
//! A member's keys are visible to a guild only while the member shares
//! with it. Share and unshare are idempotent; the redundant case is an
//! outcome, not an error, so the adapter can phrase a gentle reply.

use tracing::{info, instrument};

use keybot_core::{GameFilters, GuildId, MemberId};
use keybot_db::repositories::{members, search};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Outcome of a share or unshare request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Share added; carries the guild's pool size for the confirmation
    Shared { games_available: i64 },
    /// Already sharing with this guild (no-op)
    AlreadySharing,
    /// Share removed
    Unshared { games_available: i64 },
    /// Was not sharing with this guild (no-op)
    NotSharing,
}

/// Sharing service
pub struct SharingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SharingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start sharing the caller's keys with a guild
    #[instrument(skip(self), fields(member_id = member_id.into_inner()))]
    pub async fn share(
        &self,
        member_id: MemberId,
        member_name: &str,
        guild_id: GuildId,
    ) -> ServiceResult<ShareOutcome> {
        let mut tx = self.ctx.pool().begin().await?;
        members::get_or_create(&mut *tx, member_id, member_name).await?;
        let added = members::add_share(&mut *tx, member_id, guild_id).await?;
        tx.commit().await?;

        if !added {
            return Ok(ShareOutcome::AlreadySharing);
        }

        info!(guild_id = guild_id.into_inner(), "member now sharing");
        Ok(ShareOutcome::Shared {
            games_available: self.pool_size(guild_id).await?,
        })
    }

    /// Stop sharing the caller's keys with a guild
    ///
    /// Their keys stay in the store; they just drop out of this guild's
    /// browse and claim scope.
    #[instrument(skip(self), fields(member_id = member_id.into_inner()))]
    pub async fn unshare(
        &self,
        member_id: MemberId,
        member_name: &str,
        guild_id: GuildId,
    ) -> ServiceResult<ShareOutcome> {
        let mut tx = self.ctx.pool().begin().await?;
        members::get_or_create(&mut *tx, member_id, member_name).await?;
        let removed = members::remove_share(&mut *tx, member_id, guild_id).await?;
        tx.commit().await?;

        if !removed {
            return Ok(ShareOutcome::NotSharing);
        }

        info!(guild_id = guild_id.into_inner(), "member stopped sharing");
        Ok(ShareOutcome::Unshared {
            games_available: self.pool_size(guild_id).await?,
        })
    }

    /// Whether the member currently shares with the guild
    #[instrument(skip(self))]
    pub async fn is_sharing(&self, member_id: MemberId, guild_id: GuildId) -> ServiceResult<bool> {
        let mut conn = self.ctx.pool().acquire().await?;
        Ok(members::share_exists(&mut *conn, member_id, guild_id).await?)
    }

    async fn pool_size(&self, guild_id: GuildId) -> ServiceResult<i64> {
        Ok(search::count_games(self.ctx.pool(), &GameFilters::for_guild(guild_id)).await?)
    }
}
