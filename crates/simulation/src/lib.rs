//! Orchestrator for the tycoon simulation.
//!
//! Owns one instance of each engine plus their state, and advances them in a
//! fixed pipeline per tick: market, then mining settlement, then conditional
//! order checks, then progression. Player actions are forwarded to the right
//! engine between ticks, with XP routing applied here so the engines stay
//! unaware of each other.
//!
//! # Sections
//! - [`config`]: world configuration and its builder.
//! - [`events`]: the per-tick event stream handed to callers.
//! - [`world`]: [`GameWorld`] itself, the tick pipeline, and player actions.
//! - [`snapshot`]: full-state capture/restore and the [`SnapshotStore`] seam.

mod config;
mod events;
mod snapshot;
mod world;

pub use config::WorldConfig;
pub use events::{TickEvent, XpSource};
pub use snapshot::{JsonSnapshotStore, SnapshotError, SnapshotStore, WorldSnapshot};
pub use world::{GameWorld, TickReport};

/// XP granted per unit of currency realized when selling mined coin.
pub const MINED_SALE_XP_PER_CURRENCY: f64 = 0.01;
