//! Per-session simulation state
//!
//! All local game state lives in one [`SessionState`] passed explicitly into
//! the update stages and the network-event handler; nothing is module-global.

use std::collections::HashMap;

use uuid::Uuid;

use super::storm::StormState;
use super::weapons::WeaponSlot;

/// World size, square
pub const MAP_SIZE: f32 = 3000.0;

/// Local movement speed, world units per second
pub const PLAYER_SPEED: f32 = 220.0;

/// Starting and maximum health
pub const PLAYER_MAX_HP: f32 = 100.0;

/// Blend factor for remote position smoothing, per frame
pub const REMOTE_LERP: f32 = 0.15;

/// Minimum milliseconds between outgoing position updates
pub const NET_SYNC_RATE_MS: u64 = 50;

/// One frame of player input
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFrame {
    /// Movement axes, each in -1..=1
    pub move_x: f32,
    pub move_y: f32,
    /// Aim direction in radians
    pub aim: f32,
    pub fire: bool,
    pub reload: bool,
}

/// The locally simulated player
#[derive(Debug, Clone)]
pub struct LocalPlayer {
    pub x: f32,
    pub y: f32,
    pub rot: f32,
    pub hp: f32,
    pub armor: f32,
    pub weapon: WeaponSlot,
    pub last_fired_ms: u64,
    pub alive: bool,
}

impl LocalPlayer {
    pub fn spawn(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            rot: 0.0,
            hp: PLAYER_MAX_HP,
            armor: 0.0,
            weapon: WeaponSlot::default(),
            last_fired_ms: 0,
            alive: true,
        }
    }
}

/// A remote participant as rendered locally: the displayed transform chases
/// the most recently received one
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub name: String,
    /// Displayed position (smoothed)
    pub x: f32,
    pub y: f32,
    pub rot: f32,
    /// Last received position (smoothing target)
    pub target_x: f32,
    pub target_y: f32,
    pub target_rot: f32,
    pub hp: f32,
    pub dead: bool,
}

impl RemotePlayer {
    pub fn new(name: String, x: f32, y: f32) -> Self {
        Self {
            name,
            x,
            y,
            rot: 0.0,
            target_x: x,
            target_y: y,
            target_rot: 0.0,
            hp: PLAYER_MAX_HP,
            dead: false,
        }
    }

    pub fn alive(&self) -> bool {
        !self.dead && self.hp > 0.0
    }
}

/// Everything one client session knows about the match
#[derive(Debug, Clone)]
pub struct SessionState {
    pub me: LocalPlayer,
    pub remotes: HashMap<Uuid, RemotePlayer>,
    pub storm: StormState,
    /// A session with no opponents ever seen cannot be won
    pub seen_any_remote: bool,
    pub game_over: bool,
    pub victory: bool,
    /// Timestamp of the last storm damage tick
    pub last_storm_tick_ms: u64,
    /// Timestamp of the last outgoing position update
    pub last_sync_ms: u64,
}

impl SessionState {
    pub fn new(spawn_x: f32, spawn_y: f32) -> Self {
        Self {
            me: LocalPlayer::spawn(spawn_x, spawn_y),
            remotes: HashMap::new(),
            storm: StormState::new(MAP_SIZE),
            seen_any_remote: false,
            game_over: false,
            victory: false,
            last_storm_tick_ms: 0,
            last_sync_ms: 0,
        }
    }

    /// Spawn at a random point away from the map edge
    pub fn new_random_spawn() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let x = rng.gen_range(200.0..MAP_SIZE - 200.0);
        let y = rng.gen_range(200.0..MAP_SIZE - 200.0);
        Self::new(x, y)
    }
}
