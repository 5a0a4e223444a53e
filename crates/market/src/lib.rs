//! Synthetic market engine.
//!
//! Generates OHLCV candles per instrument via a seeded log-normal random
//! walk, derives trend/phase and technical indicators, and spawns randomized
//! macro events that bias volatility and drift. Everything is deterministic
//! given a seed: the engine owns seeded RNGs and never touches a global
//! random source.

mod engine;
mod events;
mod generator;
pub mod indicators;

pub use engine::{MarketEngine, MarketTick, TechnicalIndicators};
pub use events::{EventGenerator, EventTemplate};
pub use generator::generate_next_candle;
