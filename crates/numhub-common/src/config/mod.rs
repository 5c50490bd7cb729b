//! Configuration loading

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BroadcastConfig, ConfigError, DatabaseConfig, Environment,
    SweeperConfig, TelegramConfig,
};
