//! Application configuration structs
//!
//! Loads configuration from environment variables (with `.env` support).
//! The core treats all of these as opaque values passed into constructors.

use chrono::Duration;
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub bot: BotConfig,
    pub claim: ClaimPolicy,
    /// Games per page in paginated listings
    pub page_size: u32,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URI for the backing store
    pub url: String,
}

/// Chat-transport settings passed through to the command adapter
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Command prefix (e.g. "!")
    pub command_prefix: String,
    /// If set, guild commands are honored only in this channel
    pub channel_id: Option<i64>,
    /// Transport auth token; absent in library/test use
    pub token: Option<String>,
}

/// Claim cooldown and expiration-waiver policy
#[derive(Debug, Clone, Copy)]
pub struct ClaimPolicy {
    /// Cooldown between non-waiver, non-self claims
    pub wait_time: Duration,
    /// Window before a key's expiration during which claiming it bypasses
    /// the cooldown
    pub waiver_period: Duration,
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self {
            wait_time: Duration::seconds(default_wait_time_secs()),
            waiver_period: Duration::seconds(default_waiver_period_secs()),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {0}")]
    InvalidVar(&'static str),
}

// Default value functions
fn default_database_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_wait_time_secs() -> i64 {
    86_400 // 24 hours
}

fn default_waiver_period_secs() -> i64 {
    604_800 // 7 days
}

fn default_page_size() -> u32 {
    20
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| default_database_url()),
            },
            bot: BotConfig {
                command_prefix: env::var("BANG").unwrap_or_else(|_| default_command_prefix()),
                channel_id: parse_optional("BOT_CHANNEL_ID")?,
                token: env::var("TOKEN").ok(),
            },
            claim: ClaimPolicy {
                wait_time: Duration::seconds(
                    parse_optional("WAIT_TIME")?.unwrap_or_else(default_wait_time_secs),
                ),
                waiver_period: Duration::seconds(
                    parse_optional("EXPIRATION_WAIVER_PERIOD")?
                        .unwrap_or_else(default_waiver_period_secs),
                ),
            },
            page_size: parse_optional("PAGE_SIZE")?.unwrap_or_else(default_page_size),
        })
    }
}

/// Read an env var that must parse if present
fn parse_optional<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar(name)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ClaimPolicy::default();
        assert_eq!(policy.wait_time, Duration::seconds(86_400));
        assert_eq!(policy.waiver_period, Duration::days(7));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_database_url(), "sqlite::memory:");
        assert_eq!(default_command_prefix(), "!");
        assert_eq!(default_page_size(), 20);
    }
}
