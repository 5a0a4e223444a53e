//! Trade execution and conditional order management.

use tracing::warn;
use types::{
    CoreError, OrderId, OrderKind, OrderStatus, PendingOrder, Result, SkillBonuses, Symbol,
    Timestamp, TradeResult, TradeSide, TradingState, Transaction, TransactionId,
    BASE_COMMISSION_RATE, BASE_SLIPPAGE,
};

/// A conditional order that fired, for the orchestrator to route onward.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderExecution {
    pub order_id: OrderId,
    pub kind: OrderKind,
    pub symbol: Symbol,
    /// Actually sold quantity; clamped to holdings at trigger time.
    pub quantity: f64,
    pub execution_price: f64,
    pub pnl: f64,
}

/// Executes trades against a [`TradingState`].
///
/// Holds only the base fee schedule; all mutable state lives in the state
/// snapshot passed to each call, keeping every operation a pure-data
/// transformation that is trivial to replay in tests.
#[derive(Debug, Clone)]
pub struct TradingEngine {
    commission_rate: f64,
    slippage: f64,
}

impl Default for TradingEngine {
    fn default() -> Self {
        Self {
            commission_rate: BASE_COMMISSION_RATE,
            slippage: BASE_SLIPPAGE,
        }
    }
}

impl TradingEngine {
    /// Engine with a custom fee schedule (tests and special game modes).
    pub fn with_fees(commission_rate: f64, slippage: f64) -> Self {
        Self {
            commission_rate,
            slippage,
        }
    }

    fn effective_slippage(&self, bonuses: &SkillBonuses) -> f64 {
        self.slippage * (1.0 - bonuses.slippage_reduction.clamp(0.0, 1.0))
    }

    fn effective_commission(&self, bonuses: &SkillBonuses) -> f64 {
        self.commission_rate * (1.0 - bonuses.commission_reduction.clamp(0.0, 1.0))
    }

    fn next_transaction_id(state: &TradingState) -> TransactionId {
        TransactionId(state.transactions.len() as u64 + 1)
    }

    fn next_order_id(state: &TradingState) -> OrderId {
        // Orders are never removed, only marked terminal, so max+1 is stable.
        OrderId(
            state
                .pending_orders
                .iter()
                .map(|o| o.id.0)
                .max()
                .unwrap_or(0)
                + 1,
        )
    }

    // =========================================================================
    // Buy / Sell
    // =========================================================================

    /// Buy `quantity` of `symbol` at the quoted market price.
    ///
    /// The execution price is worse than the quote by the effective slippage,
    /// and commission is charged on the executed notional. Entry pnl is the
    /// commission drag.
    pub fn buy(
        &self,
        state: &mut TradingState,
        symbol: &str,
        quantity: f64,
        market_price: f64,
        bonuses: &SkillBonuses,
        now: Timestamp,
    ) -> TradeResult {
        if quantity <= 0.0 || market_price <= 0.0 {
            return TradeResult::rejected(state.balance, "quantity and price must be positive");
        }

        let execution_price = market_price * (1.0 + self.effective_slippage(bonuses));
        let cost = quantity * execution_price;
        let commission = cost * self.effective_commission(bonuses);
        let total = cost + commission;

        if state.balance < total {
            return TradeResult {
                success: false,
                pnl: 0.0,
                new_balance: state.balance,
                message: format!(
                    "insufficient funds: need {:.2}, have {:.2}",
                    total, state.balance
                ),
                execution_price: Some(execution_price),
            };
        }

        state.balance -= total;
        *state.holdings.entry(symbol.to_string()).or_insert(0.0) += quantity;
        state.transactions.push(Transaction {
            id: Self::next_transaction_id(state),
            side: TradeSide::Buy,
            symbol: symbol.to_string(),
            quantity,
            price: execution_price,
            commission,
            timestamp: now,
            pnl: -commission,
        });

        TradeResult {
            success: true,
            pnl: -commission,
            new_balance: state.balance,
            message: format!("bought {} {} at {:.2}", quantity, symbol, execution_price),
            execution_price: Some(execution_price),
        }
    }

    /// Sell `quantity` of `symbol` at the quoted market price.
    ///
    /// Sellers get the worse side of the spread; pnl is the net proceeds
    /// relative to a frictionless fill at the quote.
    pub fn sell(
        &self,
        state: &mut TradingState,
        symbol: &str,
        quantity: f64,
        market_price: f64,
        bonuses: &SkillBonuses,
        now: Timestamp,
    ) -> TradeResult {
        if quantity <= 0.0 || market_price <= 0.0 {
            return TradeResult::rejected(state.balance, "quantity and price must be positive");
        }

        let held = state.held(symbol);
        if held < quantity {
            return TradeResult::rejected(
                state.balance,
                format!(
                    "insufficient {}: hold {}, tried to sell {}",
                    symbol, held, quantity
                ),
            );
        }

        let execution_price = market_price * (1.0 - self.effective_slippage(bonuses));
        let gross = quantity * execution_price;
        let commission = gross * self.effective_commission(bonuses);
        let net = gross - commission;
        let pnl = net - quantity * market_price;

        state.balance += net;
        if let Some(holding) = state.holdings.get_mut(symbol) {
            *holding -= quantity;
        }
        state.transactions.push(Transaction {
            id: Self::next_transaction_id(state),
            side: TradeSide::Sell,
            symbol: symbol.to_string(),
            quantity,
            price: execution_price,
            commission,
            timestamp: now,
            pnl,
        });

        TradeResult {
            success: true,
            pnl,
            new_balance: state.balance,
            message: format!(
                "sold {} {} at {:.2}, pnl {:.2}",
                quantity, symbol, execution_price, pnl
            ),
            execution_price: Some(execution_price),
        }
    }

    // =========================================================================
    // Conditional orders
    // =========================================================================

    /// Place a stop-loss or take-profit order.
    ///
    /// Rejected when the requested quantity exceeds current holdings. The
    /// order reserves nothing; the quantity is clamped against holdings again
    /// at trigger time.
    pub fn place_order(
        &self,
        state: &mut TradingState,
        symbol: &str,
        kind: OrderKind,
        trigger_price: f64,
        quantity: f64,
        now: Timestamp,
    ) -> Result<OrderId> {
        if quantity <= 0.0 || trigger_price <= 0.0 {
            return Err(CoreError::InvalidAmount);
        }
        let held = state.held(symbol);
        if held < quantity {
            warn!(symbol, held, quantity, "order rejected: exceeds holdings");
            return Err(CoreError::InsufficientHoldings {
                symbol: symbol.to_string(),
                held,
                requested: quantity,
            });
        }

        let id = Self::next_order_id(state);
        state.pending_orders.push(PendingOrder {
            id,
            symbol: symbol.to_string(),
            kind,
            trigger_price,
            quantity,
            created_at: now,
            status: OrderStatus::Pending,
        });
        Ok(id)
    }

    /// Cancel a pending order. Terminal orders are left untouched, making
    /// cancellation idempotent; unknown ids are an error.
    pub fn cancel_order(&self, state: &mut TradingState, id: OrderId) -> Result<()> {
        let order = state
            .pending_orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        if order.status == OrderStatus::Pending {
            order.status = OrderStatus::Cancelled;
        }
        Ok(())
    }

    /// Check every pending order on `symbol` against the fresh price and
    /// execute the ones that trigger.
    ///
    /// Stop-loss fires at `price <= trigger`, take-profit at
    /// `price >= trigger`. A triggered order sells `min(order.quantity,
    /// holdings)` — never more than is actually held — and becomes
    /// `Executed`. An order triggering while nothing is held stays pending.
    pub fn check_and_execute_orders(
        &self,
        state: &mut TradingState,
        symbol: &str,
        current_price: f64,
        now: Timestamp,
    ) -> Vec<OrderExecution> {
        let triggered: Vec<OrderId> = state
            .pending_orders
            .iter()
            .filter(|o| {
                o.symbol == symbol
                    && o.status == OrderStatus::Pending
                    && match o.kind {
                        OrderKind::StopLoss => current_price <= o.trigger_price,
                        OrderKind::TakeProfit => current_price >= o.trigger_price,
                    }
            })
            .map(|o| o.id)
            .collect();

        let mut executions = Vec::new();
        for id in triggered {
            let (kind, requested) = {
                let order = state
                    .pending_orders
                    .iter()
                    .find(|o| o.id == id)
                    .expect("triggered id exists");
                (order.kind, order.quantity)
            };

            let quantity = requested.min(state.held(symbol));
            if quantity <= 0.0 {
                continue;
            }

            let result = self.sell(
                state,
                symbol,
                quantity,
                current_price,
                &SkillBonuses::default(),
                now,
            );
            if !result.success {
                continue;
            }

            let order = state
                .pending_orders
                .iter_mut()
                .find(|o| o.id == id)
                .expect("triggered id exists");
            order.status = OrderStatus::Executed;
            executions.push(OrderExecution {
                order_id: id,
                kind,
                symbol: symbol.to_string(),
                quantity,
                execution_price: result.execution_price.unwrap_or(current_price),
                pnl: result.pnl,
            });
        }
        executions
    }
}
