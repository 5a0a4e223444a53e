//! Mining engine.
//!
//! Models installed hardware (racks of miner slots), aggregate hashrate and
//! power draw, currency accrual over time, condition degradation under load,
//! and repair. Aggregates are always derived from the installed miners that
//! are running above the operating threshold — never mutated independently.

mod engine;
mod production;

pub use engine::{MiningEngine, MiningTick};
pub use production::{
    daily_electricity_cost, efficiency, miner_health, production_metrics, repair_cost, roi,
};

/// Condition at or below which a miner stops contributing (hardware failure
/// without deletion).
pub const MIN_OPERATING_CONDITION: f64 = 10.0;

/// Converts aggregate hashrate (TH/s) to mined coin per second.
pub const DIFFICULTY_DIVISOR: f64 = 1_000_000.0;

/// Repair price per condition point restored.
pub const REPAIR_COST_PER_PERCENT: f64 = 10.0;

/// Condition loss per second for an active miner, per unit of degradation
/// rate and per kilowatt of draw.
pub const ACTIVE_DECAY_COEFF: f64 = 0.001;

/// Idle miners age at 1/100th of the active rate.
pub const IDLE_DECAY_FACTOR: f64 = 0.01;

/// Per-second condition loss of a miner model while active.
pub fn active_decay_rate(degradation_rate: f64, power_watts: f64) -> f64 {
    degradation_rate * (power_watts / 1000.0) * ACTIVE_DECAY_COEFF
}
