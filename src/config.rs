//! Central configuration for the headless runner.
//!
//! All runner parameters are defined here for easy tuning.

use simulation::WorldConfig;

/// Master configuration for a headless run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Run Control
    // ─────────────────────────────────────────────────────────────────────────
    /// Total ticks to run.
    pub total_ticks: u64,
    /// Delay between ticks in milliseconds (0 = fastest).
    pub tick_delay_ms: u64,
    /// Enable verbose logging.
    pub verbose: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // World Parameters
    // ─────────────────────────────────────────────────────────────────────────
    /// Master seed for the market's random streams.
    pub seed: u64,
    /// Starting cash balance.
    pub starting_balance: f64,
    /// Simulated seconds per tick.
    pub tick_seconds: f64,

    // ─────────────────────────────────────────────────────────────────────────
    // Demo Script
    // ─────────────────────────────────────────────────────────────────────────
    /// Run the scripted demo player (buys, a stop loss, a small farm) so a
    /// plain run exercises the whole economy.
    pub demo_script: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_ticks: 5_000,
            tick_delay_ms: 0,
            verbose: false,
            seed: 42,
            starting_balance: 10_000.0,
            tick_seconds: 1.0,
            demo_script: true,
        }
    }
}

impl RunConfig {
    /// Derive the world configuration for this run.
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig::default()
            .with_seed(self.seed)
            .with_starting_balance(self.starting_balance)
            .with_tick_seconds(self.tick_seconds)
    }
}
