//! Game Dream server - room relay and lobby bot for a browser battle royale
//!
//! The server is deliberately non-authoritative: every client runs its own
//! simulation and the relay only forwards events between members of a room.
//! The crate is split into:
//! - WebSocket transport and wire protocol (`ws`)
//! - Per-room event relay and room registry (`relay`)
//! - Win reporting HTTP endpoint and router (`http`)
//! - Telegram lobby bot (`bot`)
//! - Win counter persistence (`store`)
//! - The client-side prediction/interpolation loop (`sim`), shipped as a
//!   library so the browser client build and the tests share one simulation

pub mod app;
pub mod bot;
pub mod config;
pub mod http;
pub mod relay;
pub mod sim;
pub mod store;
pub mod util;
pub mod ws;
