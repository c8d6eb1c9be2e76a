//! # keybot-common
//!
//! Shared utilities: configuration loading and telemetry setup.

pub mod config;
pub mod telemetry;

pub use config::{AppConfig, BotConfig, ClaimPolicy, ConfigError, DatabaseConfig};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig};
