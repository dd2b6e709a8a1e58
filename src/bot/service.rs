//! Bot command loop - lobby formation over Telegram

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::store::StatsStore;

use super::api::{TelegramClient, Update, User};
use super::lobby::{
    CancelOutcome, FinalizeOutcome, JoinOutcome, LobbyPlayer, LobbyRegistry, LOBBY_CAPACITY,
};

/// Long-poll window for getUpdates
const POLL_TIMEOUT_SECS: u64 = 30;

/// Back-off after a failed poll
const POLL_RETRY: Duration = Duration::from_secs(3);

/// The Telegram-facing half of the server: recruits lobbies and serves the
/// leaderboard. Runs as one task, so lobby mutation is serialized per chat.
pub struct BotService {
    telegram: TelegramClient,
    lobbies: Arc<LobbyRegistry>,
    stats: StatsStore,
    game_url: String,
}

impl BotService {
    pub fn new(state: &AppState) -> Self {
        Self {
            telegram: state.telegram.clone(),
            lobbies: state.lobbies.clone(),
            stats: state.stats.clone(),
            game_url: state.config.game_url.clone(),
        }
    }

    /// Run the update poll loop forever
    pub async fn run(self) {
        info!("Bot service started");
        let mut offset = 0i64;

        loop {
            match self.telegram.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, backing off");
                    tokio::time::sleep(POLL_RETRY).await;
                }
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let Some(from) = message.from else {
            return;
        };
        let chat_id = message.chat.id;

        // "/join@SomeBot arg" -> "/join"
        let command = text.split_whitespace().next().unwrap_or("");
        let command = command.split('@').next().unwrap_or(command);

        match command {
            "/challenge" => self.cmd_challenge(chat_id, &from).await,
            "/join" => self.cmd_join(chat_id, &from).await,
            "/go" => self.cmd_go(chat_id).await,
            "/cancel" => self.cmd_cancel(chat_id, &from).await,
            "/stats" => self.cmd_stats(chat_id).await,
            _ => debug!(chat_id, command, "ignoring non-command message"),
        }
    }

    async fn cmd_challenge(&self, chat_id: i64, from: &User) {
        if !self.lobbies.open(chat_id, from.id) {
            self.reply(chat_id, "Recruiting is already underway! Send /join.")
                .await;
            return;
        }
        self.reply(
            chat_id,
            &format!(
                "🚀 The challenge is on!\n\n\
                 Who's ready to fight? Send /join (max {} players).\n\
                 Once everyone is in, send /go to start.\n\
                 Send /cancel to call it off.",
                LOBBY_CAPACITY
            ),
        )
        .await;
    }

    async fn cmd_join(&self, chat_id: i64, from: &User) {
        let player = LobbyPlayer {
            id: from.id,
            name: from.display_name(),
        };

        match self.lobbies.join(chat_id, player) {
            JoinOutcome::NoLobby => {
                self.reply(chat_id, "No active recruitment. Start one with /challenge.")
                    .await;
            }
            JoinOutcome::AlreadyJoined => {
                self.reply(chat_id, "You're already in!").await;
            }
            JoinOutcome::Full => {
                self.reply(
                    chat_id,
                    &format!("No seats left! All {} players are in.", LOBBY_CAPACITY),
                )
                .await;
            }
            JoinOutcome::Joined { roster } => {
                let msg = format!(
                    "✅ {} joined! ({}/{})\n\n👥 Players:\n{}\n\n\
                     Ready to start? Send /go",
                    from.first_name,
                    roster.len(),
                    LOBBY_CAPACITY,
                    format_roster(&roster),
                );
                self.reply(chat_id, &msg).await;
            }
            JoinOutcome::Complete { roster } => {
                let msg = format!(
                    "✅ {} joined! ({}/{})\n\n👥 Players:\n{}\n\n\
                     🎯 Squad complete! Into battle:\n{}",
                    from.first_name,
                    roster.len(),
                    LOBBY_CAPACITY,
                    format_roster(&roster),
                    self.game_link(chat_id),
                );
                self.reply(chat_id, &msg).await;
            }
        }
    }

    async fn cmd_go(&self, chat_id: i64) {
        match self.lobbies.finalize(chat_id) {
            FinalizeOutcome::NoLobby => {
                self.reply(chat_id, "No active recruitment. Start one with /challenge.")
                    .await;
            }
            FinalizeOutcome::Empty => {
                self.reply(chat_id, "Nobody has joined yet! Send /join first.")
                    .await;
            }
            FinalizeOutcome::Started { roster } => {
                let msg = format!(
                    "🎯 Starting with {} players!\n\n👥 Roster:\n{}\n\n\
                     🔗 Game link:\n{}",
                    roster.len(),
                    format_roster(&roster),
                    self.game_link(chat_id),
                );
                self.reply(chat_id, &msg).await;
            }
        }
    }

    async fn cmd_cancel(&self, chat_id: i64, from: &User) {
        match self.lobbies.cancel(chat_id, from.id) {
            CancelOutcome::Cancelled => {
                self.reply(chat_id, "❌ Recruitment cancelled.").await;
            }
            CancelOutcome::NotCreator => {
                self.reply(chat_id, "Only the challenger can cancel.").await;
            }
            CancelOutcome::NoLobby => {
                self.reply(chat_id, "No active recruitment.").await;
            }
        }
    }

    async fn cmd_stats(&self, chat_id: i64) {
        match self.stats.top_players(10).await {
            Ok(top) if top.is_empty() => {
                self.reply(chat_id, "No stats yet.").await;
            }
            Ok(top) => {
                let mut msg = String::from("🏆 Top players:\n");
                for (i, record) in top.iter().enumerate() {
                    msg.push_str(&format!(
                        "{}. {} - {} wins\n",
                        i + 1,
                        record.username,
                        record.wins
                    ));
                }
                self.reply(chat_id, &msg).await;
            }
            Err(e) => {
                warn!(chat_id, error = %e, "failed to load leaderboard");
                self.reply(chat_id, "Database error.").await;
            }
        }
    }

    fn game_link(&self, chat_id: i64) -> String {
        format!("{}/game.html?room={}", self.game_url, chat_id)
    }

    /// Best-effort reply; delivery failures are logged and swallowed
    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.telegram.send_message(&chat_id.to_string(), text).await {
            warn!(chat_id, error = %e, "failed to send reply");
        }
    }
}

fn format_roster(roster: &[LobbyPlayer]) -> String {
    roster
        .iter()
        .enumerate()
        .map(|(i, p)| format!("  {}. {}", i + 1, p.name))
        .collect::<Vec<_>>()
        .join("\n")
}
