//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Telegram bot token
    pub bot_token: String,
    /// Telegram Bot API base URL (overridable for tests)
    pub telegram_api_url: String,

    /// Public base URL used in game links sent to chats
    pub game_url: String,
    /// SQLite database URL for the win counter
    pub database_url: String,
    /// Allowed client origin for CORS ("*" for any)
    pub client_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        };

        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddress)?;

        Ok(Self {
            server_addr,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            bot_token: env::var("BOT_TOKEN").map_err(|_| ConfigError::Missing("BOT_TOKEN"))?,
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),

            game_url: env::var("GAME_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_addr.port())),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://stats.db?mode=rwc".to_string()),
            client_origin: env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "*".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
