//! Portfolio valuation queries. Pure functions over trading state.

use std::collections::HashMap;
use types::{
    Symbol, TradeSide, TradingState, Transaction, BASE_COMMISSION_RATE, BASE_SLIPPAGE,
};

/// Unrealized pnl of a single position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPnl {
    pub pnl: f64,
    pub pnl_pct: f64,
}

/// Unrealized pnl of `quantity` bought at `buy_price`, marked at
/// `current_price`.
pub fn position_pnl(quantity: f64, buy_price: f64, current_price: f64) -> PositionPnl {
    if buy_price <= 0.0 {
        return PositionPnl {
            pnl: 0.0,
            pnl_pct: 0.0,
        };
    }
    PositionPnl {
        pnl: (current_price - buy_price) * quantity,
        pnl_pct: (current_price - buy_price) / buy_price * 100.0,
    }
}

/// Mark-to-market value of all holdings. Symbols missing from `prices`
/// contribute nothing.
pub fn portfolio_value(state: &TradingState, prices: &HashMap<Symbol, f64>) -> f64 {
    state
        .holdings
        .iter()
        .map(|(symbol, qty)| qty * prices.get(symbol).copied().unwrap_or(0.0))
        .sum()
}

/// Fraction of total capital currently invested, as a percentage [0, 100].
pub fn capital_utilization(state: &TradingState, prices: &HashMap<Symbol, f64>) -> f64 {
    let invested = portfolio_value(state, prices);
    let total = state.balance + invested;
    if total == 0.0 {
        0.0
    } else {
        invested / total * 100.0
    }
}

/// Average entry price of the open position in `symbol`, reconstructed from
/// the transaction log.
///
/// Sales consume basis proportionally at the running average, so a fully
/// closed position leaves no stale basis behind: after a full exit and
/// re-entry, only the new lot prices the position. `None` when nothing is
/// open.
pub fn average_entry_price(transactions: &[Transaction], symbol: &str) -> Option<f64> {
    let mut quantity = 0.0;
    let mut cost = 0.0;
    for tx in transactions.iter().filter(|t| t.symbol == symbol) {
        match tx.side {
            TradeSide::Buy => {
                quantity += tx.quantity;
                cost += tx.quantity * tx.price;
            }
            TradeSide::Sell => {
                if quantity > 0.0 {
                    let average = cost / quantity;
                    let closed = tx.quantity.min(quantity);
                    quantity -= closed;
                    cost -= closed * average;
                }
            }
        }
    }
    (quantity > 1e-12).then(|| cost / quantity)
}

/// Whether the balance covers a buy of `quantity` at `market_price`, worst
/// case (full slippage and commission, no skill reductions).
pub fn can_buy(state: &TradingState, quantity: f64, market_price: f64) -> bool {
    if quantity <= 0.0 || market_price <= 0.0 {
        return false;
    }
    let cost = quantity * market_price * (1.0 + BASE_SLIPPAGE);
    state.balance >= cost * (1.0 + BASE_COMMISSION_RATE)
}

/// Whether holdings cover a sale of `quantity` of `symbol`.
pub fn can_sell(state: &TradingState, symbol: &str, quantity: f64) -> bool {
    quantity > 0.0 && state.held(symbol) >= quantity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> HashMap<Symbol, f64> {
        HashMap::from([("BTC".to_string(), 50_000.0), ("ETH".to_string(), 2_500.0)])
    }

    #[test]
    fn portfolio_value_marks_to_market() {
        let mut state = TradingState::new(1_000.0);
        state.holdings.insert("BTC".to_string(), 0.1);
        state.holdings.insert("ETH".to_string(), 2.0);
        assert!((portfolio_value(&state, &prices()) - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_symbols_are_worth_nothing() {
        let mut state = TradingState::new(0.0);
        state.holdings.insert("DOGE".to_string(), 1_000_000.0);
        assert_eq!(portfolio_value(&state, &prices()), 0.0);
    }

    #[test]
    fn utilization_is_invested_over_total() {
        let mut state = TradingState::new(5_000.0);
        state.holdings.insert("BTC".to_string(), 0.1);
        // 5000 invested out of 10000 total.
        assert!((capital_utilization(&state, &prices()) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn utilization_of_empty_world_is_zero() {
        let state = TradingState::new(0.0);
        assert_eq!(capital_utilization(&state, &prices()), 0.0);
    }

    fn tx(side: TradeSide, quantity: f64, price: f64) -> Transaction {
        Transaction {
            id: types::TransactionId(0),
            side,
            symbol: "BTC".to_string(),
            quantity,
            price,
            commission: 0.0,
            timestamp: 0,
            pnl: 0.0,
        }
    }

    #[test]
    fn entry_price_averages_open_buys() {
        let txs = vec![tx(TradeSide::Buy, 1.0, 100.0), tx(TradeSide::Buy, 1.0, 200.0)];
        assert!((average_entry_price(&txs, "BTC").unwrap() - 150.0).abs() < 1e-9);
        assert!(average_entry_price(&txs, "ETH").is_none());
    }

    #[test]
    fn partial_sales_leave_the_average_unchanged() {
        let txs = vec![
            tx(TradeSide::Buy, 2.0, 100.0),
            tx(TradeSide::Sell, 1.0, 500.0),
        ];
        assert!((average_entry_price(&txs, "BTC").unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn full_exit_clears_the_basis_for_reentry() {
        // A profitable closed lot must not drag the basis of a later,
        // pricier position down and flip a losing sale into a win.
        let txs = vec![
            tx(TradeSide::Buy, 1.0, 100.0),
            tx(TradeSide::Sell, 1.0, 150.0),
            tx(TradeSide::Buy, 1.0, 200.0),
        ];
        let entry = average_entry_price(&txs, "BTC").unwrap();
        assert!((entry - 200.0).abs() < 1e-9);
        // Selling the new lot at 180 is a loss against its own basis.
        assert!((180.0 - entry) * 1.0 < 0.0);
    }

    #[test]
    fn closed_position_has_no_entry_price() {
        let txs = vec![
            tx(TradeSide::Buy, 1.0, 100.0),
            tx(TradeSide::Sell, 1.0, 150.0),
        ];
        assert!(average_entry_price(&txs, "BTC").is_none());
    }

    #[test]
    fn can_buy_accounts_for_friction() {
        let state = TradingState::new(5_000.0);
        // 0.1 BTC at 50k is exactly 5000 before friction.
        assert!(!can_buy(&state, 0.1, 50_000.0));
        assert!(can_buy(&state, 0.09, 50_000.0));
        assert!(!can_buy(&state, 0.0, 50_000.0));
    }

    #[test]
    fn can_sell_requires_holdings() {
        let mut state = TradingState::new(0.0);
        state.holdings.insert("BTC".to_string(), 0.5);
        assert!(can_sell(&state, "BTC", 0.5));
        assert!(!can_sell(&state, "BTC", 0.6));
        assert!(!can_sell(&state, "ETH", 0.1));
        assert!(!can_sell(&state, "BTC", 0.0));
    }

    #[test]
    fn position_pnl_sign_follows_price() {
        let up = position_pnl(2.0, 100.0, 110.0);
        assert!((up.pnl - 20.0).abs() < 1e-9);
        assert!((up.pnl_pct - 10.0).abs() < 1e-9);
        let down = position_pnl(2.0, 100.0, 90.0);
        assert!(down.pnl < 0.0);
    }
}
