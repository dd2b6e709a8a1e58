//! Client-side match simulation
//!
//! Runs the locally authoritative player loop: input and movement resolve
//! immediately, remote players are smoothed toward their last reported
//! positions, and damage claims from the relay are applied as received.

pub mod stages;
pub mod state;
pub mod storm;
pub mod weapons;

pub use stages::{apply_server_msg, update_frame};
pub use state::{InputFrame, SessionState};
pub use storm::StormState;
pub use weapons::{WeaponSlot, WeaponSpec};
