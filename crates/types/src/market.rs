//! Market data types: candles, trends, phases, and macro events.

use crate::ids::EventId;
use crate::{Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// OHLCV Candle
// =============================================================================

/// OHLCV candle for a single time step. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Wall clock timestamp (ms) supplied by the orchestrator's clock.
    pub timestamp: Timestamp,
    /// Opening price.
    pub open: f64,
    /// Highest price during the step.
    pub high: f64,
    /// Lowest price during the step.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Synthetic traded volume.
    pub volume: f64,
}

impl Candle {
    /// Candle range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Check if this is a bullish candle (close > open).
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Relative move from open to close.
    #[inline]
    pub fn move_pct(&self) -> f64 {
        if self.open == 0.0 {
            0.0
        } else {
            (self.close - self.open) / self.open
        }
    }
}

// =============================================================================
// Trend / Phase / Signal
// =============================================================================

/// Per-instrument price trend relative to its moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Neutral,
}

/// Coarse market mood label. Consumed by presentation only, never by
/// trading logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarketPhase {
    #[default]
    Accumulation,
    BullRun,
    Distribution,
    BearMarket,
    Crash,
}

/// Buy/sell hint derived from RSI and MACD histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TradeSignal {
    Buy,
    Sell,
    #[default]
    Neutral,
}

// =============================================================================
// Indicator outputs
// =============================================================================

/// MACD line, signal line, and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Bollinger band triple around the SMA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

// =============================================================================
// Market events
// =============================================================================

/// A macro event biasing volatility and drift while active.
///
/// `impact` maps symbols to a multiplicative factor: values above 1 push the
/// instrument up and amplify volatility, values below 1 push it down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub impact: HashMap<Symbol, f64>,
    /// Lifetime in ticks.
    pub duration: u32,
}

/// A market event together with its remaining lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event: MarketEvent,
    pub ticks_left: u32,
}

// =============================================================================
// Market state
// =============================================================================

/// Per-instrument market state: latest price, trend, bounded candle history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentState {
    pub price: f64,
    pub trend: Trend,
    pub history: Vec<Candle>,
}

impl InstrumentState {
    /// Seed an instrument at a starting price with empty history.
    pub fn new(price: f64) -> Self {
        Self {
            price,
            trend: Trend::Neutral,
            history: Vec::new(),
        }
    }

    /// Close of the most recent candle, or the seeded price before any
    /// candle exists.
    pub fn last_close(&self) -> f64 {
        self.history.last().map(|c| c.close).unwrap_or(self.price)
    }
}

/// Snapshot of the whole synthetic market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarketState {
    pub instruments: HashMap<Symbol, InstrumentState>,
    pub active_events: Vec<ActiveEvent>,
    pub phase: MarketPhase,
    pub global_volatility: f64,
}

impl MarketState {
    /// Current price for a symbol, if it exists.
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.instruments.get(symbol).map(|i| i.price)
    }

    /// All current prices keyed by symbol.
    pub fn prices(&self) -> HashMap<Symbol, f64> {
        self.instruments
            .iter()
            .map(|(s, i)| (s.clone(), i.price))
            .collect()
    }
}
