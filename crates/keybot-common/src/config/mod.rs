//! Configuration loading

mod app_config;

pub use app_config::{AppConfig, BotConfig, ClaimPolicy, ConfigError, DatabaseConfig};
