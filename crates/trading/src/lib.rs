//! Trading engine.
//!
//! Executes buys and sells against the portfolio ledger with slippage and
//! commission, and manages the stop-loss/take-profit order state machine.
//! All operations mutate state only on the success path, so any rejected
//! action is safe to retry with corrected inputs.

mod engine;
mod portfolio;

pub use engine::{OrderExecution, TradingEngine};
pub use portfolio::{
    average_entry_price, can_buy, can_sell, capital_utilization, portfolio_value, position_pnl,
    PositionPnl,
};
