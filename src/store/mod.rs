//! Persistence layer

pub mod stats;

pub use stats::{StatsStore, StoreError, WinRecord};
