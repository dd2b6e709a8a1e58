//! Telegram Bot API client over plain HTTP

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::Config;

/// Thin typed client for the Telegram Bot API methods this bot needs
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.telegram_api_url.clone(),
            token: config.bot_token.clone(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(TelegramError::Request)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api { status, body });
        }

        let envelope: ApiResponse<T> = response.json().await.map_err(TelegramError::Parse)?;
        if !envelope.ok {
            return Err(TelegramError::Api {
                status: 200,
                body: envelope.description.unwrap_or_default(),
            });
        }
        envelope.result.ok_or(TelegramError::EmptyResult)
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        // Request timeout must outlast the server-side long-poll window
        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs + 10),
        )
        .await
    }

    /// Send a plain text message to a chat
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let body = SendMessage { chat_id, text };
        let _sent: Message = self
            .call("sendMessage", &body, Duration::from_secs(10))
            .await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram wraps every response in this envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// An incoming update
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// A chat message
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

impl User {
    /// Display name preference matches what players see in chat
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.first_name.clone())
    }
}

/// Telegram API errors
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),

    #[error("API response carried no result")]
    EmptyResult,
}
