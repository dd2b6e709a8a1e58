//! Frame update pipeline
//!
//! The hosting engine calls [`update_frame`] once per frame; each stage is a
//! free function over [`SessionState`]. Outbound events are returned rather
//! than sent, so the pipeline stays transport-free. Incoming network events
//! go through [`apply_server_msg`]: last message wins, there is no
//! reconciliation with locally predicted outcomes.

use tracing::debug;

use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::state::{
    InputFrame, RemotePlayer, SessionState, MAP_SIZE, NET_SYNC_RATE_MS, PLAYER_SPEED, REMOTE_LERP,
};
use super::storm::STORM_TICK_MS;
use super::weapons::WeaponSlot;

/// Run all per-frame stages in order. `now_ms` is the session clock,
/// `dt` the frame delta in seconds.
pub fn update_frame(
    state: &mut SessionState,
    input: &InputFrame,
    now_ms: u64,
    dt: f32,
) -> Vec<ClientMsg> {
    let mut outbound = Vec::new();

    if state.game_over {
        return outbound;
    }

    if let Some(shot) = apply_input(state, input, now_ms, dt) {
        outbound.push(shot);
    }

    advance_storm(state, dt);
    if let Some(died) = apply_storm_damage(state, now_ms) {
        outbound.push(died);
    }

    interpolate_remotes(state);

    if let Some(pos) = sync_position(state, now_ms) {
        outbound.push(pos);
    }

    if check_win(state) {
        debug!("local victory detected");
    }

    outbound
}

/// Stage: move, aim, reload and fire from this frame's input. Movement and
/// firing resolve locally with no network round-trip; a fired shot is
/// reported to peers as an event.
pub fn apply_input(
    state: &mut SessionState,
    input: &InputFrame,
    now_ms: u64,
    dt: f32,
) -> Option<ClientMsg> {
    let me = &mut state.me;

    let mut vx = input.move_x.clamp(-1.0, 1.0) * PLAYER_SPEED;
    let mut vy = input.move_y.clamp(-1.0, 1.0) * PLAYER_SPEED;
    // Diagonal movement is not faster
    if vx != 0.0 && vy != 0.0 {
        vx *= std::f32::consts::FRAC_1_SQRT_2;
        vy *= std::f32::consts::FRAC_1_SQRT_2;
    }
    me.x = (me.x + vx * dt).clamp(0.0, MAP_SIZE);
    me.y = (me.y + vy * dt).clamp(0.0, MAP_SIZE);

    // Rotation is applied directly, no smoothing on the local player
    me.rot = input.aim;

    if input.reload {
        me.weapon.reload();
    }

    if input.fire && now_ms.saturating_sub(me.last_fired_ms) >= me.weapon.spec.fire_rate_ms {
        if me.weapon.try_fire() {
            me.last_fired_ms = now_ms;
            return Some(ClientMsg::Shoot {
                x: me.x,
                y: me.y,
                angle: me.rot,
                weapon: me.weapon.spec.kind,
            });
        }
    }

    None
}

/// Stage: advance the storm phase machine
pub fn advance_storm(state: &mut SessionState, dt: f32) {
    state.storm.advance(dt as f64 * 1000.0);
}

/// Stage: periodic storm damage while outside the safe circle. Returns the
/// death report if the storm finished us off.
pub fn apply_storm_damage(state: &mut SessionState, now_ms: u64) -> Option<ClientMsg> {
    if !state.storm.started() {
        return None;
    }
    if now_ms.saturating_sub(state.last_storm_tick_ms) < STORM_TICK_MS {
        return None;
    }
    state.last_storm_tick_ms = now_ms;

    if state.storm.contains(state.me.x, state.me.y) {
        return None;
    }
    take_damage(state, state.storm.tick_damage())
}

/// Stage: blend each remote's displayed position toward its last received
/// one. Exponential smoothing, not physical simulation; rotation snaps.
pub fn interpolate_remotes(state: &mut SessionState) {
    for remote in state.remotes.values_mut() {
        if remote.dead {
            continue;
        }
        remote.x += (remote.target_x - remote.x) * REMOTE_LERP;
        remote.y += (remote.target_y - remote.y) * REMOTE_LERP;
        remote.rot = remote.target_rot;
    }
}

/// Stage: report our transform to peers at the sync rate
pub fn sync_position(state: &mut SessionState, now_ms: u64) -> Option<ClientMsg> {
    if now_ms.saturating_sub(state.last_sync_ms) < NET_SYNC_RATE_MS {
        return None;
    }
    state.last_sync_ms = now_ms;
    Some(ClientMsg::Pos {
        x: state.me.x,
        y: state.me.y,
        rot: state.me.rot,
        hp: state.me.hp,
    })
}

/// Apply claimed damage to the local player. Armor absorbs half the hit, up
/// to whatever armor remains. Returns the death report when hp reaches zero.
pub fn take_damage(state: &mut SessionState, amount: f32) -> Option<ClientMsg> {
    if state.game_over {
        return None;
    }
    let me = &mut state.me;

    let mut damage = amount;
    if me.armor > 0.0 {
        let absorbed = me.armor.min(damage * 0.5);
        me.armor -= absorbed;
        damage -= absorbed;
    }
    me.hp = (me.hp - damage).max(0.0);

    if me.hp <= 0.0 {
        me.alive = false;
        state.game_over = true;
        return Some(ClientMsg::Died);
    }
    None
}

/// Apply an incoming relay event to session state. The most recent message
/// silently overwrites whatever the local prediction believed.
pub fn apply_server_msg(state: &mut SessionState, msg: &ServerMsg) -> Option<ClientMsg> {
    match msg {
        ServerMsg::CurrentPlayers { players } => {
            for peer in players {
                state.seen_any_remote = true;
                state
                    .remotes
                    .entry(peer.id)
                    .or_insert_with(|| RemotePlayer::new(peer.name.clone(), peer.x, peer.y));
            }
            None
        }
        ServerMsg::PlayerJoined { id, name } => {
            state.seen_any_remote = true;
            state
                .remotes
                .entry(*id)
                .or_insert_with(|| RemotePlayer::new(name.clone(), 0.0, 0.0));
            None
        }
        ServerMsg::PlayerMoved { id, x, y, rot, hp } => {
            if let Some(remote) = state.remotes.get_mut(id) {
                remote.target_x = *x;
                remote.target_y = *y;
                remote.target_rot = *rot;
                remote.hp = *hp;
            }
            None
        }
        // Projectile spawning is the renderer's concern; the sim only cares
        // about the eventual youWereHit claim.
        ServerMsg::PlayerShot { .. } => None,
        ServerMsg::YouWereHit { damage, .. } => take_damage(state, *damage),
        ServerMsg::PlayerDied { id } => {
            if let Some(remote) = state.remotes.get_mut(id) {
                remote.dead = true;
            }
            None
        }
        ServerMsg::PlayerLeft { id } => {
            state.remotes.remove(id);
            None
        }
        ServerMsg::PlayerCount { .. } => None,
    }
}

/// Declare local victory once every opponent we ever saw is dead or gone
pub fn check_win(state: &mut SessionState) -> bool {
    if state.game_over || !state.seen_any_remote {
        return false;
    }
    let alive_enemies = state.remotes.values().filter(|r| r.alive()).count();
    if alive_enemies == 0 && !state.remotes.is_empty() {
        state.game_over = true;
        state.victory = true;
        return true;
    }
    false
}

/// Loot pickups mutate the session directly
pub fn pickup_medkit(state: &mut SessionState) {
    state.me.hp = (state.me.hp + 40.0).min(super::state::PLAYER_MAX_HP);
}

pub fn pickup_armor(state: &mut SessionState) {
    state.me.armor = (state.me.armor + 50.0).min(100.0);
}

pub fn pickup_ammo(state: &mut SessionState) {
    state.me.weapon.add_ammo(30);
}

pub fn pickup_weapon(state: &mut SessionState, slot: WeaponSlot) {
    state.me.weapon = slot;
}
