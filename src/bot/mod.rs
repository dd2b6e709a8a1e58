//! Telegram lobby bot

pub mod api;
pub mod lobby;
pub mod service;

pub use api::{TelegramClient, TelegramError};
pub use lobby::{LobbyRegistry, LOBBY_CAPACITY};
pub use service::BotService;
