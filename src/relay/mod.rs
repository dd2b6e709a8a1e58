//! Room relay - broadcast scoping without game authority
//!
//! The relay forwards events between members of a room and keeps nothing but
//! each participant's last reported transform. It never validates what a
//! client claims (health, damage, hits); a stricter mode would plug in at
//! [`room::validate`] without touching the transport.

pub mod registry;
pub mod room;

pub use registry::{RoomHandle, RoomRegistry};

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::ws::protocol::{ServerMsg, WeaponKind};

/// Commands delivered to a room task. One task owns each room's participant
/// map, so every command is handled to completion before the next - the
/// relay's main safety property.
#[derive(Debug)]
pub enum RoomCmd {
    Join {
        conn_id: Uuid,
        name: String,
        tx: mpsc::Sender<ServerMsg>,
        /// Dropped without reply if the room shut down before the join was
        /// processed; the registry then retries against a fresh room.
        ack: oneshot::Sender<()>,
    },
    Position {
        conn_id: Uuid,
        x: f32,
        y: f32,
        rot: f32,
        hp: f32,
    },
    Shoot {
        conn_id: Uuid,
        x: f32,
        y: f32,
        angle: f32,
        weapon: WeaponKind,
    },
    Hit {
        conn_id: Uuid,
        target_id: Uuid,
        damage: f32,
    },
    Died {
        conn_id: Uuid,
    },
    Leave {
        conn_id: Uuid,
    },
}
