//! End-to-end tests for the room relay, driven through the registry the same
//! way the websocket handler drives it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use game_dream_server::relay::{RoomCmd, RoomHandle, RoomRegistry};
use game_dream_server::ws::protocol::{ServerMsg, WeaponKind};

struct TestClient {
    conn_id: Uuid,
    rx: mpsc::Receiver<ServerMsg>,
    handle: RoomHandle,
}

impl TestClient {
    async fn recv(&mut self) -> ServerMsg {
        timeout(Duration::from_secs(1), self.rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    async fn assert_silent(&mut self) {
        let got = timeout(Duration::from_millis(100), self.rx.recv()).await;
        assert!(got.is_err(), "expected no event, got {:?}", got.unwrap());
    }

    async fn send(&self, cmd: RoomCmd) {
        assert!(self.handle.send(cmd).await, "room task is gone");
    }

    async fn leave(&self) {
        self.send(RoomCmd::Leave {
            conn_id: self.conn_id,
        })
        .await;
    }
}

async fn join(registry: &RoomRegistry, room: &str, name: &str) -> TestClient {
    let conn_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(64);
    let handle = registry.join(room, conn_id, name.to_string(), tx).await;
    TestClient {
        conn_id,
        rx,
        handle,
    }
}

/// Wait for the room task to deregister itself after its last member left
async fn wait_for_room_close(registry: &RoomRegistry, room: &str) {
    for _ in 0..100 {
        if !registry.contains(room) {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("room {room} never closed");
}

#[tokio::test]
async fn joiner_is_seeded_and_announced() {
    let registry = RoomRegistry::new();

    let mut alice = join(&registry, "r1", "Alice").await;
    // First joiner sees an empty room and their own count
    assert!(matches!(
        alice.recv().await,
        ServerMsg::CurrentPlayers { players } if players.is_empty()
    ));
    assert!(matches!(
        alice.recv().await,
        ServerMsg::PlayerCount { count: 1 }
    ));

    let mut bob = join(&registry, "r1", "Bob").await;

    // Bob's snapshot holds Alice
    match bob.recv().await {
        ServerMsg::CurrentPlayers { players } => {
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].id, alice.conn_id);
            assert_eq!(players[0].name, "Alice");
        }
        other => panic!("expected currentPlayers, got {other:?}"),
    }
    assert!(matches!(
        bob.recv().await,
        ServerMsg::PlayerCount { count: 2 }
    ));

    // Alice is told about Bob, then the new count
    match alice.recv().await {
        ServerMsg::PlayerJoined { id, name } => {
            assert_eq!(id, bob.conn_id);
            assert_eq!(name, "Bob");
        }
        other => panic!("expected playerJoined, got {other:?}"),
    }
    assert!(matches!(
        alice.recv().await,
        ServerMsg::PlayerCount { count: 2 }
    ));
}

#[tokio::test]
async fn position_reaches_everyone_but_the_sender() {
    let registry = RoomRegistry::new();
    let mut alice = join(&registry, "r1", "Alice").await;
    let mut bob = join(&registry, "r1", "Bob").await;
    let mut carol = join(&registry, "r1", "Carol").await;

    // Drain the join chatter
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    bob.recv().await;
    bob.recv().await;
    bob.recv().await;
    bob.recv().await;
    carol.recv().await;
    carol.recv().await;

    alice
        .send(RoomCmd::Position {
            conn_id: alice.conn_id,
            x: 10.0,
            y: 20.0,
            rot: 1.0,
            hp: 80.0,
        })
        .await;

    for peer in [&mut bob, &mut carol] {
        match peer.recv().await {
            ServerMsg::PlayerMoved { id, x, y, rot, hp } => {
                assert_eq!(id, alice.conn_id);
                assert_eq!((x, y, rot, hp), (10.0, 20.0, 1.0, 80.0));
            }
            other => panic!("expected playerMoved, got {other:?}"),
        }
    }
    alice.assert_silent().await;
}

#[tokio::test]
async fn shoot_is_forwarded_verbatim() {
    let registry = RoomRegistry::new();
    let mut alice = join(&registry, "r1", "Alice").await;
    let mut bob = join(&registry, "r1", "Bob").await;

    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    bob.recv().await;
    bob.recv().await;

    alice
        .send(RoomCmd::Shoot {
            conn_id: alice.conn_id,
            x: 5.0,
            y: 6.0,
            angle: 0.5,
            weapon: WeaponKind::Rifle,
        })
        .await;

    match bob.recv().await {
        ServerMsg::PlayerShot {
            id,
            x,
            y,
            angle,
            weapon,
        } => {
            assert_eq!(id, alice.conn_id);
            assert_eq!((x, y, angle), (5.0, 6.0, 0.5));
            assert_eq!(weapon, WeaponKind::Rifle);
        }
        other => panic!("expected playerShot, got {other:?}"),
    }
    alice.assert_silent().await;
}

#[tokio::test]
async fn hit_is_unicast_to_the_target_only() {
    let registry = RoomRegistry::new();
    let mut alice = join(&registry, "r1", "Alice").await;
    let mut bob = join(&registry, "r1", "Bob").await;
    let mut carol = join(&registry, "r1", "Carol").await;

    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    bob.recv().await;
    bob.recv().await;
    bob.recv().await;
    bob.recv().await;
    carol.recv().await;
    carol.recv().await;

    alice
        .send(RoomCmd::Hit {
            conn_id: alice.conn_id,
            target_id: bob.conn_id,
            damage: 40.0,
        })
        .await;

    match bob.recv().await {
        ServerMsg::YouWereHit {
            attacker_id,
            damage,
        } => {
            assert_eq!(attacker_id, alice.conn_id);
            assert_eq!(damage, 40.0);
        }
        other => panic!("expected youWereHit, got {other:?}"),
    }
    alice.assert_silent().await;
    carol.assert_silent().await;

    // A hit naming a target not in the room is dropped without fanout
    alice
        .send(RoomCmd::Hit {
            conn_id: alice.conn_id,
            target_id: Uuid::new_v4(),
            damage: 99.0,
        })
        .await;
    bob.assert_silent().await;
    carol.assert_silent().await;
}

#[tokio::test]
async fn death_is_announced_to_the_others() {
    let registry = RoomRegistry::new();
    let mut alice = join(&registry, "r1", "Alice").await;
    let mut bob = join(&registry, "r1", "Bob").await;

    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    bob.recv().await;
    bob.recv().await;

    alice
        .send(RoomCmd::Died {
            conn_id: alice.conn_id,
        })
        .await;

    match bob.recv().await {
        ServerMsg::PlayerDied { id } => assert_eq!(id, alice.conn_id),
        other => panic!("expected playerDied, got {other:?}"),
    }
    alice.assert_silent().await;
}

#[tokio::test]
async fn leave_updates_the_room_and_the_last_leave_closes_it() {
    let registry = RoomRegistry::new();
    let mut alice = join(&registry, "r1", "Alice").await;
    let mut bob = join(&registry, "r1", "Bob").await;

    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    alice.recv().await;
    bob.recv().await;
    bob.recv().await;

    bob.leave().await;

    match alice.recv().await {
        ServerMsg::PlayerLeft { id } => assert_eq!(id, bob.conn_id),
        other => panic!("expected playerLeft, got {other:?}"),
    }
    assert!(matches!(
        alice.recv().await,
        ServerMsg::PlayerCount { count: 1 }
    ));

    // Room stays up while Alice remains
    assert!(registry.contains("r1"));
    assert_eq!(registry.total_players(), 1);

    alice.leave().await;
    wait_for_room_close(&registry, "r1").await;
    assert_eq!(registry.active_rooms(), 0);
    assert_eq!(registry.total_players(), 0);

    // Joining the same id again creates a fresh, empty room
    let mut again = join(&registry, "r1", "Dana").await;
    assert!(matches!(
        again.recv().await,
        ServerMsg::CurrentPlayers { players } if players.is_empty()
    ));
    assert!(matches!(
        again.recv().await,
        ServerMsg::PlayerCount { count: 1 }
    ));
}

#[tokio::test]
async fn rooms_are_isolated_from_each_other() {
    let registry = RoomRegistry::new();
    let mut alice = join(&registry, "east", "Alice").await;
    let mut bob = join(&registry, "west", "Bob").await;

    alice.recv().await;
    alice.recv().await;
    bob.recv().await;
    bob.recv().await;

    alice
        .send(RoomCmd::Position {
            conn_id: alice.conn_id,
            x: 1.0,
            y: 2.0,
            rot: 0.0,
            hp: 100.0,
        })
        .await;

    bob.assert_silent().await;
    assert_eq!(registry.active_rooms(), 2);
}

#[tokio::test]
async fn duplicate_member_joins_are_commands_in_order() {
    // The same connection joining twice is prevented at the socket layer,
    // but two distinct connections with one name are fine.
    let registry = RoomRegistry::new();
    let mut a = join(&registry, "r1", "Twin").await;
    let b = join(&registry, "r1", "Twin").await;

    a.recv().await; // currentPlayers
    a.recv().await; // playerCount 1
    match a.recv().await {
        ServerMsg::PlayerJoined { id, name } => {
            assert_eq!(id, b.conn_id);
            assert_eq!(name, "Twin");
        }
        other => panic!("expected playerJoined, got {other:?}"),
    }
}
