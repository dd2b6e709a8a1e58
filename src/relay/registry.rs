//! Process-wide registry of live rooms

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

use super::room::Room;
use super::RoomCmd;

/// Command queue depth per room
const ROOM_QUEUE_DEPTH: usize = 256;

/// Handle to a running room task
#[derive(Clone)]
pub struct RoomHandle {
    pub room_id: String,
    cmd_tx: mpsc::Sender<RoomCmd>,
    member_count: Arc<AtomicUsize>,
}

impl RoomHandle {
    /// Forward a command to the room task. Returns false if the room task
    /// has already shut down.
    pub async fn send(&self, cmd: RoomCmd) -> bool {
        self.cmd_tx.send(cmd).await.is_ok()
    }

    pub fn member_count(&self) -> usize {
        self.member_count.load(Ordering::Relaxed)
    }
}

/// Registry of all active rooms. Rooms are created lazily on first join and
/// removed when their task exits; nothing here survives a restart.
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
        }
    }

    /// Register a connection under a room, creating the room if absent.
    /// The joiner's `currentPlayers` snapshot and the room-wide notifications
    /// are emitted by the room task itself.
    pub async fn join(
        &self,
        room_id: &str,
        conn_id: Uuid,
        name: String,
        tx: mpsc::Sender<ServerMsg>,
    ) -> RoomHandle {
        loop {
            let handle = self
                .rooms
                .entry(room_id.to_string())
                .or_insert_with(|| self.spawn_room(room_id))
                .clone();

            let (ack_tx, ack_rx) = oneshot::channel();
            let sent = handle
                .send(RoomCmd::Join {
                    conn_id,
                    name: name.clone(),
                    tx: tx.clone(),
                    ack: ack_tx,
                })
                .await;
            if sent && ack_rx.await.is_ok() {
                return handle;
            }

            // Lost a race against the room task shutting down; drop the
            // stale entry and recreate the room.
            self.rooms.remove_if(room_id, |_, h| h.cmd_tx.is_closed());
        }
    }

    fn spawn_room(&self, room_id: &str) -> RoomHandle {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(ROOM_QUEUE_DEPTH);
        let member_count = Arc::new(AtomicUsize::new(0));
        let mut room = Room::new(room_id.to_string(), member_count.clone());

        let rooms = self.rooms.clone();
        let id = room_id.to_string();
        let my_tx = cmd_tx.clone();
        tokio::spawn(async move {
            room.run(&mut cmd_rx).await;

            // Deregister before closing the queue so a racing join either
            // reaches the buffered drain below (and retries when its ack is
            // dropped) or creates a fresh room. Only remove our own entry;
            // a replacement room may already occupy this id.
            rooms.remove_if(&id, |_, h| h.cmd_tx.same_channel(&my_tx));
            cmd_rx.close();
            while cmd_rx.recv().await.is_some() {
                // Buffered joins are dropped with their ack, forcing a retry.
            }
            debug!(room = %id, "room removed from registry");
        });

        RoomHandle {
            room_id: room_id.to_string(),
            cmd_tx,
            member_count,
        }
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_players(&self) -> usize {
        self.rooms.iter().map(|r| r.value().member_count()).sum()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
