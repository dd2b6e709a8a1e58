//! Room state and the per-room relay task

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::ws::protocol::{PeerInfo, ServerMsg, WeaponKind};

use super::RoomCmd;

/// A connected participant and their last self-reported state
#[derive(Debug)]
pub struct Member {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub rot: f32,
    pub hp: f32,
    /// Outbound channel to this participant's socket writer
    tx: mpsc::Sender<ServerMsg>,
}

/// Hook point for an authoritative mode. The relay trusts the sender
/// entirely; a stricter deployment would reject or clamp here.
pub fn validate(_cmd: &RoomCmd) -> bool {
    true
}

/// Room state, owned by the room task
pub struct Room {
    id: String,
    members: HashMap<Uuid, Member>,
    member_count: Arc<AtomicUsize>,
}

impl Room {
    pub(crate) fn new(id: String, member_count: Arc<AtomicUsize>) -> Self {
        Self {
            id,
            members: HashMap::new(),
            member_count,
        }
    }

    /// Run the relay loop until the last member leaves
    pub(crate) async fn run(&mut self, rx: &mut mpsc::Receiver<RoomCmd>) {
        while let Some(cmd) = rx.recv().await {
            if !validate(&cmd) {
                continue;
            }

            let emptied = matches!(cmd, RoomCmd::Leave { .. });
            match cmd {
                RoomCmd::Join {
                    conn_id,
                    name,
                    tx,
                    ack,
                } => self.handle_join(conn_id, name, tx, ack),
                RoomCmd::Position {
                    conn_id,
                    x,
                    y,
                    rot,
                    hp,
                } => self.handle_position(conn_id, x, y, rot, hp),
                RoomCmd::Shoot {
                    conn_id,
                    x,
                    y,
                    angle,
                    weapon,
                } => self.handle_shoot(conn_id, x, y, angle, weapon),
                RoomCmd::Hit {
                    conn_id,
                    target_id,
                    damage,
                } => self.handle_hit(conn_id, target_id, damage),
                RoomCmd::Died { conn_id } => self.handle_died(conn_id),
                RoomCmd::Leave { conn_id } => self.handle_leave(conn_id),
            }

            // Rooms never outlive their members
            if emptied && self.members.is_empty() {
                info!(room = %self.id, "last member left, closing room");
                break;
            }
        }
    }

    fn handle_join(
        &mut self,
        conn_id: Uuid,
        name: String,
        tx: mpsc::Sender<ServerMsg>,
        ack: oneshot::Sender<()>,
    ) {
        // Snapshot of everyone already here, for the joiner's initial seeding
        let others: Vec<PeerInfo> = self
            .members
            .iter()
            .map(|(id, m)| PeerInfo {
                id: *id,
                name: m.name.clone(),
                x: m.x,
                y: m.y,
            })
            .collect();

        send(&tx, ServerMsg::CurrentPlayers { players: others });

        self.broadcast_except(
            conn_id,
            ServerMsg::PlayerJoined {
                id: conn_id,
                name: name.clone(),
            },
        );

        self.members.insert(
            conn_id,
            Member {
                name: name.clone(),
                x: 0.0,
                y: 0.0,
                rot: 0.0,
                hp: 100.0,
                tx,
            },
        );
        self.member_count.store(self.members.len(), Ordering::Relaxed);

        self.broadcast_all(ServerMsg::PlayerCount {
            count: self.members.len(),
        });

        let _ = ack.send(());

        info!(
            room = %self.id,
            conn_id = %conn_id,
            name = %name,
            members = self.members.len(),
            "player joined room"
        );
    }

    fn handle_position(&mut self, conn_id: Uuid, x: f32, y: f32, rot: f32, hp: f32) {
        // Unknown connection ids are a silent no-op; no validation, no clamping
        let Some(member) = self.members.get_mut(&conn_id) else {
            return;
        };
        member.x = x;
        member.y = y;
        member.rot = rot;
        member.hp = hp;

        self.broadcast_except(
            conn_id,
            ServerMsg::PlayerMoved {
                id: conn_id,
                x,
                y,
                rot,
                hp,
            },
        );
    }

    fn handle_shoot(&self, conn_id: Uuid, x: f32, y: f32, angle: f32, weapon: WeaponKind) {
        // Stateless forward; the relay stores nothing about shots
        self.broadcast_except(
            conn_id,
            ServerMsg::PlayerShot {
                id: conn_id,
                x,
                y,
                angle,
                weapon,
            },
        );
    }

    fn handle_hit(&self, conn_id: Uuid, target_id: Uuid, damage: f32) {
        // Unicast to the claimed target only; the target applies the damage
        // locally. Damage is the attacker's claim, forwarded as-is.
        let Some(target) = self.members.get(&target_id) else {
            debug!(room = %self.id, target = %target_id, "hit for unknown target dropped");
            return;
        };
        send(
            &target.tx,
            ServerMsg::YouWereHit {
                attacker_id: conn_id,
                damage,
            },
        );
    }

    fn handle_died(&self, conn_id: Uuid) {
        self.broadcast_except(conn_id, ServerMsg::PlayerDied { id: conn_id });
    }

    fn handle_leave(&mut self, conn_id: Uuid) {
        let Some(member) = self.members.remove(&conn_id) else {
            return;
        };
        self.member_count.store(self.members.len(), Ordering::Relaxed);

        self.broadcast_all(ServerMsg::PlayerLeft { id: conn_id });
        self.broadcast_all(ServerMsg::PlayerCount {
            count: self.members.len(),
        });

        info!(
            room = %self.id,
            conn_id = %conn_id,
            name = %member.name,
            members = self.members.len(),
            "player left room"
        );
    }

    /// Send to every member except the originator. The sender already knows
    /// what happened; only passive observers need the event.
    fn broadcast_except(&self, sender: Uuid, msg: ServerMsg) {
        for (id, member) in &self.members {
            if *id != sender {
                send(&member.tx, msg.clone());
            }
        }
    }

    fn broadcast_all(&self, msg: ServerMsg) {
        for member in self.members.values() {
            send(&member.tx, msg.clone());
        }
    }
}

/// Best-effort delivery. A full or closed outbound queue drops the event;
/// the protocol has no delivery guarantee beyond transport ordering.
fn send(tx: &mpsc::Sender<ServerMsg>, msg: ServerMsg) {
    if let Err(e) = tx.try_send(msg) {
        debug!(error = %e, "dropping event for slow or gone client");
    }
}
