//! Core types for the tycoon simulation.
//!
//! This crate provides all shared data types used across the four engines
//! (market, trading, mining, progression) and the orchestrator: id newtypes,
//! OHLCV candles, engine state snapshots, static catalogs, and the error
//! taxonomy. Every state type here is plain serializable data — numbers,
//! strings, vectors, maps — so any persistence backend can round-trip it.

mod catalog;
mod error;
mod ids;
mod market;
mod mining;
mod progression;
mod trading;

pub use catalog::{Catalog, CatalogError, MinerModel, RackModel, SkillDef, SkillEffect};
pub use error::{CoreError, Result};
pub use ids::{EventId, MinerId, OrderId, RackId, TransactionId};
pub use market::{
    ActiveEvent, BollingerOutput, Candle, InstrumentState, MacdOutput, MarketEvent, MarketPhase,
    MarketState, TradeSignal, Trend,
};
pub use mining::{
    InstalledMiner, MinerHealth, MiningEfficiency, MiningFarmState, MiningRoi, ProductionMetrics,
    Rack,
};
pub use progression::{League, LevelData, ProgressionState, XpBreakdown};
pub use trading::{
    OrderKind, OrderStatus, PendingOrder, SkillBonuses, TradeResult, TradeSide, TradingState,
    Transaction,
};

// =============================================================================
// Aliases
// =============================================================================

/// Instrument symbol, e.g. "BTC".
pub type Symbol = String;

/// Catalog entry identifier, e.g. "asic_s9" or "trader_1".
pub type ModelId = String;

/// Simulation tick counter.
pub type Tick = u64;

/// Wall clock timestamp in milliseconds since the epoch.
pub type Timestamp = u64;

// =============================================================================
// Market constants
// =============================================================================

/// Hard floor for any generated price. Prices never reach zero.
pub const MIN_PRICE: f64 = 100.0;

/// Hard ceiling for any generated price.
pub const MAX_PRICE: f64 = 100_000.0;

/// Baseline per-tick volatility (0.2%).
pub const BASE_VOLATILITY: f64 = 0.002;

/// Bound on per-instrument candle history; oldest candles are evicted.
pub const MAX_CANDLE_HISTORY: usize = 100;

// =============================================================================
// Trading constants
// =============================================================================

/// Commission rate on notional, before skill reductions (0.1%).
pub const BASE_COMMISSION_RATE: f64 = 0.001;

/// Slippage rate applied against the trader on both sides (0.05%).
pub const BASE_SLIPPAGE: f64 = 0.0005;
