//! The event stream produced by the tick pipeline and player actions.

use types::{Candle, MarketEvent, MinerId, OrderId, OrderKind, Symbol};

/// Where an XP award came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpSource {
    Trade,
    Quiz,
    MinedSale,
}

/// One thing that happened, in pipeline order: market events first, then
/// mining, then order executions and the XP they triggered.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    CandleClosed {
        symbol: Symbol,
        candle: Candle,
    },
    EventStarted(MarketEvent),
    EventExpired(MarketEvent),
    /// A miner crossed the operating threshold and stopped contributing.
    MinerFailed(MinerId),
    OrderExecuted {
        order_id: OrderId,
        kind: OrderKind,
        symbol: Symbol,
        quantity: f64,
        execution_price: f64,
        pnl: f64,
    },
    XpAwarded {
        amount: u64,
        source: XpSource,
    },
    LeveledUp {
        level: u32,
        skill_points_gained: u32,
    },
}
