//! Inventory service
//!
//! Adding keys to a member's stock and taking their own keys back out.
//! Both paths run inside one transaction so the game row and its keys
//! stay consistent (a game never persists with zero keys).

use tracing::{info, instrument};

use keybot_core::{normalize_title, DomainError, GameId, Key, KeyId, MemberId, Platform};
use keybot_db::repositories::{games, keys, members};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Inventory service
pub struct InventoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InventoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a key to the caller's stock
    ///
    /// With an explicit platform the code must match one of that
    /// platform's formats; without one the platform is inferred from the
    /// code (first configured match wins). The game is created on first
    /// sight of its normalized title.
    #[instrument(skip(self, code), fields(member_id = member_id.into_inner()))]
    pub async fn add_key(
        &self,
        member_id: MemberId,
        member_name: &str,
        platform_name: Option<&str>,
        code: &str,
        game_title: &str,
    ) -> ServiceResult<Key> {
        let platform = self.resolve_for_code(platform_name, code)?;

        if normalize_title(game_title).is_empty() {
            return Err(DomainError::BlankSearchTerm.into());
        }

        let mut tx = self.ctx.pool().begin().await?;

        // Pre-check for the friendlier error; the UNIQUE constraint on the
        // code column still backstops a racing insert.
        if keys::code_exists(&mut *tx, code).await? {
            return Err(DomainError::DuplicateKey.into());
        }

        members::get_or_create(&mut *tx, member_id, member_name).await?;
        let game = games::get_or_create(&mut *tx, game_title).await?;
        let model = keys::insert(
            &mut *tx,
            GameId::new(game.id),
            platform.search_name(),
            code,
            member_id,
            None,
        )
        .await?;

        tx.commit().await?;

        info!(
            game = %game.pretty_name,
            platform = platform.search_name(),
            "key added"
        );
        Ok(Key::from(model))
    }

    /// Take one of the caller's own keys back out of stock
    ///
    /// Scoped strictly to keys the caller added; removal neither checks
    /// nor starts the claim cooldown. The earliest-expiring matching key
    /// is removed, and the game is pruned if that was its last key.
    #[instrument(skip(self), fields(member_id = member_id.into_inner()))]
    pub async fn remove_key(
        &self,
        member_id: MemberId,
        member_name: &str,
        platform_name: &str,
        game_title: &str,
    ) -> ServiceResult<Key> {
        let platform = self
            .ctx
            .registry()
            .resolve(platform_name)
            .ok_or_else(|| DomainError::PlatformNotFound(platform_name.to_string()))?;

        let name = normalize_title(game_title);
        if name.is_empty() {
            return Err(DomainError::BlankSearchTerm.into());
        }

        let mut tx = self.ctx.pool().begin().await?;

        members::get_or_create(&mut *tx, member_id, member_name).await?;

        // Scoped to the caller's own stock: a game they hold no keys in
        // reads as not found.
        let game = games::find_stocked_by(&mut *tx, &name, member_id)
            .await?
            .ok_or_else(|| DomainError::GameNotFound(game_title.to_string()))?;

        let no_keys = || DomainError::NoKeysForPlatform {
            game: game.pretty_name.clone(),
            platform: platform.name().to_string(),
        };

        let model = keys::find_owned(&mut *tx, &name, platform.search_name(), member_id)
            .await?
            .ok_or_else(no_keys)?;

        if !keys::delete_by_id(&mut *tx, KeyId::new(model.id)).await? {
            return Err(no_keys().into());
        }
        games::delete_if_empty(&mut *tx, GameId::new(game.id)).await?;

        tx.commit().await?;

        info!(
            game = %game.pretty_name,
            platform = platform.search_name(),
            "key removed by owner"
        );
        Ok(Key::from(model))
    }

    fn resolve_for_code(
        &self,
        platform_name: Option<&str>,
        code: &str,
    ) -> Result<&Platform, DomainError> {
        match platform_name {
            Some(name) => {
                let platform = self
                    .ctx
                    .registry()
                    .resolve(name)
                    .ok_or_else(|| DomainError::PlatformNotFound(name.to_string()))?;
                if !platform.is_valid_code(code) {
                    return Err(DomainError::InvalidKeyFormat {
                        platform: platform.name().to_string(),
                    });
                }
                Ok(platform)
            }
            None => self
                .ctx
                .registry()
                .infer(code)
                .ok_or(DomainError::UnrecognizedKeyFormat),
        }
    }
}
