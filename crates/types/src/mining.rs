//! Mining farm types: racks, installed miners, and derived aggregates.

use crate::ids::{MinerId, RackId};
use crate::ModelId;
use serde::{Deserialize, Serialize};

// =============================================================================
// Installed hardware
// =============================================================================

/// A miner installed in a rack slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledMiner {
    pub id: MinerId,
    pub model_id: ModelId,
    /// Wear state, 100 (new) down to 0 (dead).
    pub condition: f64,
    pub active: bool,
}

impl InstalledMiner {
    /// A freshly installed miner: full condition, running.
    pub fn new(id: MinerId, model_id: impl Into<ModelId>) -> Self {
        Self {
            id,
            model_id: model_id.into(),
            condition: 100.0,
            active: true,
        }
    }
}

/// A rack holding a fixed number of miner slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    pub id: RackId,
    pub model_id: ModelId,
    pub slots: Vec<Option<InstalledMiner>>,
}

impl Rack {
    /// An empty rack with `slots` open positions.
    pub fn new(id: RackId, model_id: impl Into<ModelId>, slots: usize) -> Self {
        Self {
            id,
            model_id: model_id.into(),
            slots: vec![None; slots],
        }
    }

    /// Index of the first empty slot, if any.
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }
}

/// Health bucket for a miner's condition, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinerHealth {
    Healthy,
    Degraded,
    Critical,
    Broken,
}

// =============================================================================
// Farm state
// =============================================================================

/// The mining farm.
///
/// `total_hashrate` and `total_power` are derived from the installed miners
/// that are active and above the operating threshold; they are recomputed
/// every settlement pass, never mutated independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningFarmState {
    pub racks: Vec<Rack>,
    /// Mined currency accumulated since the last sale. Monotone until sold.
    pub mined: f64,
    pub total_hashrate: f64,
    pub total_power: f64,
    /// Electricity price per watt-second.
    pub cost_per_watt: f64,
}

impl MiningFarmState {
    /// An empty farm with the given electricity price.
    pub fn new(cost_per_watt: f64) -> Self {
        Self {
            racks: Vec::new(),
            mined: 0.0,
            total_hashrate: 0.0,
            total_power: 0.0,
            cost_per_watt,
        }
    }

    /// Find a rack by id.
    pub fn rack(&self, id: RackId) -> Option<&Rack> {
        self.racks.iter().find(|r| r.id == id)
    }

    /// Find a rack by id, mutably.
    pub fn rack_mut(&mut self, id: RackId) -> Option<&mut Rack> {
        self.racks.iter_mut().find(|r| r.id == id)
    }
}

// =============================================================================
// Analytics
// =============================================================================

/// Production rates at the current hashrate and coin price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ProductionMetrics {
    pub coin_per_second: f64,
    pub coin_per_hour: f64,
    pub coin_per_day: f64,
    pub currency_per_second: f64,
    pub currency_per_hour: f64,
    pub currency_per_day: f64,
}

/// Return-on-investment summary for the farm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiningRoi {
    pub total_investment: f64,
    pub daily_profit: f64,
    pub monthly_profit: f64,
    /// `f64::INFINITY` when the farm never breaks even.
    pub days_to_break_even: f64,
    pub annual_roi: f64,
}

/// Output-per-watt efficiency figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MiningEfficiency {
    pub hash_per_watt: f64,
    pub currency_per_watt: f64,
}
