//! Pre-game lobby sessions, one per chat
//!
//! Lobbies live in process memory only and are lost on restart. All mutation
//! happens on the single bot poll task, which serializes commands per chat;
//! the registry itself is shareable so the HTTP side can inspect it.

use dashmap::DashMap;

/// Fixed lobby capacity
pub const LOBBY_CAPACITY: usize = 8;

/// A user who joined a lobby
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyPlayer {
    pub id: i64,
    pub name: String,
}

/// An open recruitment session for one chat
#[derive(Debug)]
struct Lobby {
    creator: i64,
    players: Vec<LobbyPlayer>,
    active: bool,
}

/// Outcome of a `/join`
#[derive(Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Added; lobby still recruiting
    Joined { roster: Vec<LobbyPlayer> },
    /// Added and the lobby filled up; recruiting closed
    Complete { roster: Vec<LobbyPlayer> },
    AlreadyJoined,
    Full,
    NoLobby,
}

/// Outcome of a `/go`
#[derive(Debug, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Started { roster: Vec<LobbyPlayer> },
    Empty,
    NoLobby,
}

/// Outcome of a `/cancel`
#[derive(Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// Only the user who opened the lobby may cancel it
    NotCreator,
    NoLobby,
}

/// Registry of lobby sessions keyed by chat id
pub struct LobbyRegistry {
    lobbies: DashMap<i64, Lobby>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self {
            lobbies: DashMap::new(),
        }
    }

    /// Open recruiting in a chat. Returns false if one is already active.
    pub fn open(&self, chat_id: i64, creator: i64) -> bool {
        if self
            .lobbies
            .get(&chat_id)
            .map(|l| l.active)
            .unwrap_or(false)
        {
            return false;
        }
        self.lobbies.insert(
            chat_id,
            Lobby {
                creator,
                players: Vec::new(),
                active: true,
            },
        );
        true
    }

    /// Add a player to the chat's lobby, dedup by user id
    pub fn join(&self, chat_id: i64, player: LobbyPlayer) -> JoinOutcome {
        let Some(mut lobby) = self.lobbies.get_mut(&chat_id) else {
            return JoinOutcome::NoLobby;
        };
        if !lobby.active {
            return JoinOutcome::NoLobby;
        }
        if lobby.players.iter().any(|p| p.id == player.id) {
            return JoinOutcome::AlreadyJoined;
        }
        if lobby.players.len() >= LOBBY_CAPACITY {
            return JoinOutcome::Full;
        }

        lobby.players.push(player);
        let roster = lobby.players.clone();
        if roster.len() == LOBBY_CAPACITY {
            lobby.active = false;
            JoinOutcome::Complete { roster }
        } else {
            JoinOutcome::Joined { roster }
        }
    }

    /// Finalize recruiting early with whoever joined
    pub fn finalize(&self, chat_id: i64) -> FinalizeOutcome {
        let Some(mut lobby) = self.lobbies.get_mut(&chat_id) else {
            return FinalizeOutcome::NoLobby;
        };
        if !lobby.active {
            return FinalizeOutcome::NoLobby;
        }
        if lobby.players.is_empty() {
            return FinalizeOutcome::Empty;
        }
        lobby.active = false;
        FinalizeOutcome::Started {
            roster: lobby.players.clone(),
        }
    }

    /// Abort recruiting. Only the lobby's creator may cancel.
    pub fn cancel(&self, chat_id: i64, user_id: i64) -> CancelOutcome {
        {
            let Some(lobby) = self.lobbies.get(&chat_id) else {
                return CancelOutcome::NoLobby;
            };
            if !lobby.active {
                return CancelOutcome::NoLobby;
            }
            if lobby.creator != user_id {
                return CancelOutcome::NotCreator;
            }
        }
        self.lobbies.remove(&chat_id);
        CancelOutcome::Cancelled
    }
}

impl Default for LobbyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64) -> LobbyPlayer {
        LobbyPlayer {
            id,
            name: format!("p{}", id),
        }
    }

    #[test]
    fn open_rejects_second_active_lobby() {
        let reg = LobbyRegistry::new();
        assert!(reg.open(1, 100));
        assert!(!reg.open(1, 101));
        // A different chat is unaffected
        assert!(reg.open(2, 100));
    }

    #[test]
    fn join_requires_an_active_lobby() {
        let reg = LobbyRegistry::new();
        assert_eq!(reg.join(1, player(1)), JoinOutcome::NoLobby);

        reg.open(1, 100);
        assert!(matches!(reg.join(1, player(1)), JoinOutcome::Joined { .. }));
        assert_eq!(reg.join(1, player(1)), JoinOutcome::AlreadyJoined);
    }

    #[test]
    fn lobby_closes_when_capacity_reached() {
        let reg = LobbyRegistry::new();
        reg.open(1, 100);

        for id in 1..LOBBY_CAPACITY as i64 {
            assert!(matches!(reg.join(1, player(id)), JoinOutcome::Joined { .. }));
        }
        match reg.join(1, player(LOBBY_CAPACITY as i64)) {
            JoinOutcome::Complete { roster } => assert_eq!(roster.len(), LOBBY_CAPACITY),
            other => panic!("expected Complete, got {:?}", other),
        }

        // Recruiting is over; late joiners are turned away
        assert_eq!(reg.join(1, player(99)), JoinOutcome::NoLobby);
    }

    #[test]
    fn finalize_needs_at_least_one_player() {
        let reg = LobbyRegistry::new();
        assert_eq!(reg.finalize(1), FinalizeOutcome::NoLobby);

        reg.open(1, 100);
        assert_eq!(reg.finalize(1), FinalizeOutcome::Empty);

        reg.join(1, player(1));
        match reg.finalize(1) {
            FinalizeOutcome::Started { roster } => assert_eq!(roster.len(), 1),
            other => panic!("expected Started, got {:?}", other),
        }
        assert_eq!(reg.finalize(1), FinalizeOutcome::NoLobby);
    }

    #[test]
    fn cancel_discards_the_session() {
        let reg = LobbyRegistry::new();
        assert_eq!(reg.cancel(1, 100), CancelOutcome::NoLobby);

        reg.open(1, 100);
        reg.join(1, player(1));
        assert_eq!(reg.cancel(1, 999), CancelOutcome::NotCreator);
        assert_eq!(reg.cancel(1, 100), CancelOutcome::Cancelled);

        // A fresh lobby starts empty
        assert!(reg.open(1, 100));
        match reg.join(1, player(2)) {
            JoinOutcome::Joined { roster } => assert_eq!(roster.len(), 1),
            other => panic!("expected Joined, got {:?}", other),
        }
    }
}
