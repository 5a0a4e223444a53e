//! Trading types: portfolio ledger, transactions, and conditional orders.

use crate::ids::{OrderId, TransactionId};
use crate::{Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Sides, kinds, statuses
// =============================================================================

/// Direction of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Kind of conditional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Sells when price falls to or below the trigger.
    StopLoss,
    /// Sells when price rises to or above the trigger.
    TakeProfit,
}

/// Order lifecycle. `Executed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Executed,
    Cancelled,
}

// =============================================================================
// Ledger records
// =============================================================================

/// A settled trade, appended to the transaction log. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub side: TradeSide,
    pub symbol: Symbol,
    pub quantity: f64,
    /// Realized execution price, slippage included.
    pub price: f64,
    pub commission: f64,
    pub timestamp: Timestamp,
    /// Realized pnl relative to a frictionless fill at the quoted price.
    pub pnl: f64,
}

/// A resting stop-loss or take-profit order. Reserves no holdings; the
/// quantity is re-checked against holdings at trigger time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub id: OrderId,
    pub symbol: Symbol,
    pub kind: OrderKind,
    pub trigger_price: f64,
    pub quantity: f64,
    pub created_at: Timestamp,
    pub status: OrderStatus,
}

// =============================================================================
// Trading state
// =============================================================================

/// The player's portfolio: cash balance, holdings, transaction log, and
/// resting conditional orders.
///
/// Invariants: holdings never go negative (enforced at sell/trigger time),
/// and a trade never drives the balance negative. Electricity costs debited
/// by the mining engine are the one explicitly allowed clamp-at-zero path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingState {
    pub balance: f64,
    pub holdings: HashMap<Symbol, f64>,
    pub transactions: Vec<Transaction>,
    pub pending_orders: Vec<PendingOrder>,
}

impl TradingState {
    /// Create a fresh state with a starting balance.
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            holdings: HashMap::new(),
            transactions: Vec::new(),
            pending_orders: Vec::new(),
        }
    }

    /// Quantity held of a symbol (zero when absent).
    pub fn held(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).copied().unwrap_or(0.0)
    }
}

// =============================================================================
// Results and bonuses
// =============================================================================

/// Outcome of a buy/sell action, shaped for direct UI consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub success: bool,
    pub pnl: f64,
    pub new_balance: f64,
    pub message: String,
    pub execution_price: Option<f64>,
}

impl TradeResult {
    /// A rejection that leaves the balance untouched.
    pub fn rejected(balance: f64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            pnl: 0.0,
            new_balance: balance,
            message: message.into(),
            execution_price: None,
        }
    }
}

/// Skill-derived fee reductions applied to a trade. Fractions in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SkillBonuses {
    pub commission_reduction: f64,
    pub slippage_reduction: f64,
    pub xp_bonus: f64,
}
