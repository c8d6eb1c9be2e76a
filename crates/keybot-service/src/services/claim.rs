//! Claim service
//!
//! Claiming removes the selected key from inventory, delivers the code to
//! the claimant, and starts their cooldown, all inside one transaction.
//! Delivery runs before commit: if the claimant cannot receive the code,
//! the whole claim rolls back and the key stays in the pool.

use chrono::Utc;
use tracing::{info, instrument, warn};

use keybot_core::{
    normalize_title, ClaimedKey, DomainError, GameId, GuildId, Key, KeyDelivery, MemberId,
};
use keybot_db::repositories::{games, keys, members};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Claim service
pub struct ClaimService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ClaimService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Claim a key for (game, platform) from the guild's shared pool
    ///
    /// Selection is earliest-expiring-first among keys whose creator
    /// shares with the guild. The claim cooldown applies unless the
    /// selected key is the claimant's own or is inside its expiration
    /// waiver window; those claims also do not start a new cooldown.
    #[instrument(
        skip(self, delivery),
        fields(member_id = member_id.into_inner(), guild_id = guild_id.into_inner())
    )]
    pub async fn claim(
        &self,
        member_id: MemberId,
        member_name: &str,
        guild_id: GuildId,
        platform_name: &str,
        game_title: &str,
        delivery: &dyn KeyDelivery,
    ) -> ServiceResult<ClaimedKey> {
        let platform = self
            .ctx
            .registry()
            .resolve(platform_name)
            .ok_or_else(|| DomainError::PlatformNotFound(platform_name.to_string()))?;

        let name = normalize_title(game_title);
        if name.is_empty() {
            return Err(DomainError::BlankSearchTerm.into());
        }

        let policy = self.ctx.policy();
        let now = Utc::now();

        let mut tx = self.ctx.pool().begin().await?;

        let member = members::get_or_create(&mut *tx, member_id, member_name).await?;
        let cooldown = member.cooldown_remaining(policy.wait_time, now);

        // Scoped existence check: a game stocked only outside this
        // guild's visibility reads as not found.
        let game = games::find_visible_to_guild(&mut *tx, &name, guild_id)
            .await?
            .ok_or_else(|| DomainError::GameNotFound(game_title.to_string()))?;

        let model = keys::find_claimable(&mut *tx, &name, platform.search_name(), guild_id)
            .await?
            .ok_or_else(|| DomainError::NoKeysForPlatform {
                game: game.pretty_name.clone(),
                platform: platform.name().to_string(),
            })?;
        let key = Key::from(model);

        // Cooldown is waived for the claimant's own keys and for keys
        // close enough to expiry that they would otherwise rot unclaimed.
        let own_key = key.is_owned_by(member_id);
        let waived = key.in_waiver_period(policy.waiver_period, now);
        if let Some(remaining) = cooldown {
            if !own_key && !waived {
                return Err(DomainError::CooldownActive { remaining }.into());
            }
        }

        // Identity-conditioned delete: the loser of a concurrent claim of
        // the same last key affects zero rows and reports no keys left.
        if !keys::delete_by_id(&mut *tx, key.id).await? {
            return Err(DomainError::NoKeysForPlatform {
                game: game.pretty_name.clone(),
                platform: platform.name().to_string(),
            }
            .into());
        }
        games::delete_if_empty(&mut *tx, GameId::new(game.id)).await?;

        if !own_key && !waived {
            members::update_last_claim(&mut *tx, member_id, now).await?;
        }

        let claimed = ClaimedKey {
            game: game.pretty_name.clone(),
            platform: platform.name().to_string(),
            code: key.code.clone(),
            expiration: key.expiration,
        };

        // Deliver before commit so an unreachable claimant rolls the
        // claim back and the key stays available.
        if let Err(e) = delivery.deliver(member_id, &claimed).await {
            warn!(error = %e, "key delivery failed, rolling back claim");
            return Err(DomainError::DeliveryFailed(e.to_string()).into());
        }

        tx.commit().await?;

        info!(
            game = %claimed.game,
            platform = platform.search_name(),
            own_key,
            waived,
            "key claimed"
        );
        Ok(claimed)
    }

    /// Remaining cooldown for a member, if any
    ///
    /// Read-only view for a "when can I claim again" command.
    #[instrument(skip(self))]
    pub async fn cooldown(&self, member_id: MemberId) -> ServiceResult<Option<chrono::Duration>> {
        let mut conn = self.ctx.pool().acquire().await?;
        let member = members::find_by_id(&mut *conn, member_id).await?;
        Ok(member.and_then(|m| m.cooldown_remaining(self.ctx.policy().wait_time, Utc::now())))
    }
}
