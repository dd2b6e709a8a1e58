//! WebSocket protocol message definitions
//! These are the wire types for client-server communication
//!
//! Event and payload field names are fixed: existing browser clients speak
//! exactly this shape (a `type`-tagged JSON object per event).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weapon kinds carried in shoot events. The relay never interprets them,
/// it only forwards the tag so peers can render the right projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    Pistol,
    Shotgun,
    Rifle,
    Sniper,
}

impl Default for WeaponKind {
    fn default() -> Self {
        Self::Pistol
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Join a room; the first message a client must send
    #[serde(rename = "joinRoom")]
    JoinRoom {
        /// Room identifier, usually the originating chat id
        room: Option<String>,
        /// Display name, free text, may collide
        name: Option<String>,
    },

    /// Position update, sent roughly 20 times per second
    #[serde(rename = "pos")]
    Pos { x: f32, y: f32, rot: f32, hp: f32 },

    /// A shot was fired locally
    #[serde(rename = "shoot")]
    Shoot {
        x: f32,
        y: f32,
        angle: f32,
        weapon: WeaponKind,
    },

    /// A locally simulated bullet hit another player
    #[serde(rename = "hit")]
    Hit {
        #[serde(rename = "targetId")]
        target_id: Uuid,
        damage: f32,
    },

    /// Local player died
    #[serde(rename = "died")]
    Died,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMsg {
    /// Snapshot of everyone already in the room, sent to a new joiner
    #[serde(rename = "currentPlayers")]
    CurrentPlayers { players: Vec<PeerInfo> },

    /// Another player joined the room
    #[serde(rename = "playerJoined")]
    PlayerJoined { id: Uuid, name: String },

    /// Another player moved
    #[serde(rename = "playerMoved")]
    PlayerMoved {
        id: Uuid,
        x: f32,
        y: f32,
        rot: f32,
        hp: f32,
    },

    /// Another player fired
    #[serde(rename = "playerShot")]
    PlayerShot {
        id: Uuid,
        x: f32,
        y: f32,
        angle: f32,
        weapon: WeaponKind,
    },

    /// You were hit; apply the claimed damage locally
    #[serde(rename = "youWereHit")]
    YouWereHit {
        #[serde(rename = "attackerId")]
        attacker_id: Uuid,
        damage: f32,
    },

    /// Another player died
    #[serde(rename = "playerDied")]
    PlayerDied { id: Uuid },

    /// A player disconnected
    #[serde(rename = "playerLeft")]
    PlayerLeft { id: Uuid },

    /// Current room size, sent to everyone on join and leave
    #[serde(rename = "playerCount")]
    PlayerCount { count: usize },
}

/// Last-known participant state, as reported by that participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: Uuid,
    pub name: String,
    pub x: f32,
    pub y: f32,
}
