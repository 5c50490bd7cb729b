//! Application configuration structs
//!
//! Loads configuration from environment variables. Missing required
//! variables are fatal: the process must not start half-configured.

use std::env;
use std::time::Duration;

use numhub_core::UserId;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub broadcast: BroadcastConfig,
    pub sweeper: SweeperConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
    /// The administrator's chat-platform user id
    pub admin_id: UserId,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Bound on waiting for a pooled connection; no store call blocks
    /// indefinitely
    pub acquire_timeout: Duration,
}

/// Telegram gateway configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Bot API base URL; overridable for tests
    pub api_base: String,
    pub request_timeout: Duration,
}

/// Broadcast engine tuning
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Pacing delay between sends
    pub send_delay: Duration,
}

/// Background sweeper intervals
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub pro_expiry_interval: Duration,
    pub memory_gc_interval: Duration,
    pub retention_interval: Duration,
    /// Sleep after a failed sweep iteration before retrying
    pub error_backoff: Duration,
}

// Default value functions
fn default_app_name() -> String {
    "numhub".to_string()
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            send_delay: Duration::from_millis(100),
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            pro_expiry_interval: Duration::from_secs(3600),
            memory_gc_interval: Duration::from_secs(300),
            retention_interval: Duration::from_secs(3600),
            error_backoff: Duration::from_secs(300),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let admin_id = env::var("ADMIN_ID")
            .map_err(|_| ConfigError::MissingVar("ADMIN_ID"))?
            .parse::<UserId>()
            .map_err(|e| ConfigError::InvalidValue("ADMIN_ID", e.to_string()))?;

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
                admin_id,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
                acquire_timeout: Duration::from_secs(
                    env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(10),
                ),
            },
            telegram: TelegramConfig {
                bot_token: env::var("TELEGRAM_BOT_TOKEN")
                    .map_err(|_| ConfigError::MissingVar("TELEGRAM_BOT_TOKEN"))?,
                api_base: env::var("TELEGRAM_API_BASE").unwrap_or_else(|_| default_api_base()),
                request_timeout: Duration::from_secs(
                    env::var("TELEGRAM_REQUEST_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(30),
                ),
            },
            broadcast: BroadcastConfig {
                send_delay: Duration::from_millis(
                    env::var("BROADCAST_SEND_DELAY_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(100),
                ),
            },
            sweeper: SweeperConfig::default(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
