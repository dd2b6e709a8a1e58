//! Shared application state

use std::sync::Arc;

use crate::bot::{LobbyRegistry, TelegramClient};
use crate::config::Config;
use crate::relay::RoomRegistry;
use crate::store::{StatsStore, StoreError};

/// Handles shared by the HTTP routes, the websocket sessions and the bot
/// poller. Cloning is cheap; everything inside is reference-counted or
/// pooled.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rooms: Arc<RoomRegistry>,
    pub stats: StatsStore,
    pub telegram: TelegramClient,
    pub lobbies: Arc<LobbyRegistry>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, StoreError> {
        let stats = StatsStore::connect(&config.database_url).await?;
        let telegram = TelegramClient::new(&config);

        Ok(Self {
            config: Arc::new(config),
            rooms: Arc::new(RoomRegistry::new()),
            stats,
            telegram,
            lobbies: Arc::new(LobbyRegistry::new()),
        })
    }
}
