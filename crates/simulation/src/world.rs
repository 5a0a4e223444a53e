//! The game world: one instance of each engine, their state, and the tick
//! pipeline that binds them.

use crate::config::WorldConfig;
use crate::events::{TickEvent, XpSource};
use crate::snapshot::WorldSnapshot;
use crate::MINED_SALE_XP_PER_CURRENCY;
use market::{MarketEngine, TechnicalIndicators};
use mining::{daily_electricity_cost, production_metrics, MiningEngine};
use progression::{aggregate_bonuses, Bonuses, ProgressionEngine, XpOutcome};
use trading::{average_entry_price, portfolio_value, TradingEngine};
use tracing::{debug, info, warn};
use types::{
    Catalog, CoreError, MinerId, MiningFarmState, MiningRoi, OrderId, OrderKind,
    ProductionMetrics, ProgressionState, RackId, Result, Tick, Timestamp, TradeResult,
    TradeSignal, TradingState,
};

/// What one tick produced, in pipeline order.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    pub events: Vec<TickEvent>,
    /// Coin accrued by the farm this tick.
    pub mined_delta: f64,
    /// Electricity debited from the shared balance this tick.
    pub electricity_cost: f64,
}

/// The orchestrated world.
///
/// The engines never see each other; this type owns the shared balance (it
/// lives inside [`TradingState`]) and fixes the order in which the engines
/// touch it within a tick: the mining settlement debits electricity before
/// conditional orders settle, and XP is applied last.
pub struct GameWorld {
    config: WorldConfig,
    catalog: Catalog,
    market: MarketEngine,
    trading_engine: TradingEngine,
    mining_engine: MiningEngine,
    progression_engine: ProgressionEngine,
    trading: TradingState,
    mining: MiningFarmState,
    progression: ProgressionState,
    tick: Tick,
}

impl GameWorld {
    /// Build a world from a config and the standard catalog.
    pub fn new(config: WorldConfig) -> Self {
        Self::with_catalog(config, Catalog::standard())
    }

    /// Build a world with a custom catalog (scenario tests, modded games).
    pub fn with_catalog(config: WorldConfig, catalog: Catalog) -> Self {
        if let Err(e) = catalog.validate() {
            warn!(error = %e, "catalog failed validation");
        }
        let market = MarketEngine::new(&config.symbols, config.seed);
        let trading = TradingState::new(config.starting_balance);
        let mining = MiningFarmState::new(config.cost_per_watt);
        info!(
            seed = config.seed,
            symbols = config.symbols.len(),
            balance = config.starting_balance,
            "world created"
        );
        Self {
            market,
            trading_engine: TradingEngine::default(),
            mining_engine: MiningEngine,
            progression_engine: ProgressionEngine,
            trading,
            mining,
            progression: ProgressionState::default(),
            tick: 0,
            config,
            catalog,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn market(&self) -> &types::MarketState {
        self.market.state()
    }

    pub fn trading(&self) -> &TradingState {
        &self.trading
    }

    pub fn mining(&self) -> &MiningFarmState {
        &self.mining
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.market.price(symbol)
    }

    pub fn indicators(&self, symbol: &str) -> Option<TechnicalIndicators> {
        self.market.technical_indicators(symbol)
    }

    pub fn trade_signal(&self, symbol: &str) -> Option<TradeSignal> {
        self.market.trade_signal(symbol)
    }

    /// Cash plus holdings marked to current prices.
    pub fn net_worth(&self) -> f64 {
        self.trading.balance + portfolio_value(&self.trading, &self.market.state().prices())
    }

    /// Farm production at the current mined-coin price, or `None` when the
    /// configured mined symbol is not an instrument.
    pub fn mining_production(&self) -> Option<ProductionMetrics> {
        let price = self.market.price(&self.config.mined_symbol)?;
        Some(production_metrics(self.mining.total_hashrate, price))
    }

    /// Farm return-on-investment against hardware spend so far.
    pub fn mining_roi(&self) -> Option<MiningRoi> {
        let production = self.mining_production()?;
        let invested: f64 = self
            .mining
            .racks
            .iter()
            .map(|rack| {
                let rack_cost = self
                    .catalog
                    .rack_model(&rack.model_id)
                    .map(|m| m.cost)
                    .unwrap_or(0.0);
                let miners: f64 = rack
                    .slots
                    .iter()
                    .flatten()
                    .filter_map(|m| self.catalog.miner_model(&m.model_id))
                    .map(|m| m.cost)
                    .sum();
                rack_cost + miners
            })
            .sum();
        let daily = daily_electricity_cost(self.mining.total_power, self.mining.cost_per_watt);
        Some(mining::roi(invested, &production, daily))
    }

    // =========================================================================
    // Tick pipeline
    // =========================================================================

    /// Advance the world by one tick of `config.tick_seconds` simulated
    /// seconds.
    ///
    /// Pipeline order, fixed: the market closes a candle per instrument, the
    /// mining settlement accrues coin and debits electricity from the shared
    /// balance, conditional orders are checked against the fresh prices (so
    /// their proceeds land on the post-electricity balance), and finally XP
    /// from executed orders is applied.
    pub fn step(&mut self) -> TickReport {
        self.tick += 1;
        let dt = self.config.tick_seconds;
        let now = self.now();
        let mut events = Vec::new();

        // 1. Market.
        let market_tick = self.market.tick(dt, now);
        for (symbol, candle) in &market_tick.candles {
            events.push(TickEvent::CandleClosed {
                symbol: symbol.clone(),
                candle: candle.clone(),
            });
        }
        for event in market_tick.started {
            events.push(TickEvent::EventStarted(event));
        }
        for event in market_tick.expired {
            events.push(TickEvent::EventExpired(event));
        }

        // 2. Mining settlement, electricity first on the shared balance.
        let bonuses = self.bonuses();
        let mining_tick = self.mining_engine.tick(
            &mut self.mining,
            &mut self.trading.balance,
            &self.catalog,
            bonuses.mining_efficiency,
            dt,
        );
        for id in &mining_tick.failed {
            events.push(TickEvent::MinerFailed(*id));
        }

        // 3. Conditional orders against the fresh prices.
        for (symbol, _) in &market_tick.candles {
            let Some(price) = self.market.price(symbol) else {
                continue;
            };
            // Basis before this tick's sales; sales at the average leave the
            // average itself unchanged, so one value covers every execution.
            let entry = average_entry_price(&self.trading.transactions, symbol);
            let executions =
                self.trading_engine
                    .check_and_execute_orders(&mut self.trading, symbol, price, now);
            for execution in executions {
                let notional = execution.quantity * execution.execution_price;
                let realized =
                    Self::realized_against(entry, execution.quantity, execution.execution_price);
                events.push(TickEvent::OrderExecuted {
                    order_id: execution.order_id,
                    kind: execution.kind,
                    symbol: execution.symbol,
                    quantity: execution.quantity,
                    execution_price: execution.execution_price,
                    pnl: realized,
                });
                // 4. Progression, last.
                self.award_trade_xp(realized, notional, &bonuses, &mut events);
            }
        }

        debug!(
            tick = self.tick,
            events = events.len(),
            balance = self.trading.balance,
            "world tick"
        );
        TickReport {
            tick: self.tick,
            events,
            mined_delta: mining_tick.mined_delta,
            electricity_cost: mining_tick.electricity_cost,
        }
    }

    // =========================================================================
    // Trading actions
    // =========================================================================

    /// Market buy at the current price.
    pub fn buy(&mut self, symbol: &str, quantity: f64) -> Result<TradeResult> {
        let price = self.price_of(symbol)?;
        let bonuses = self.bonuses();
        let now = self.now();
        Ok(self
            .trading_engine
            .buy(&mut self.trading, symbol, quantity, price, &bonuses.trade, now))
    }

    /// Market sell at the current price. A successful sale is a realized
    /// outcome: it feeds the streak and awards trade XP.
    pub fn sell(&mut self, symbol: &str, quantity: f64) -> Result<(TradeResult, Vec<TickEvent>)> {
        let price = self.price_of(symbol)?;
        let bonuses = self.bonuses();
        let now = self.now();
        // Capture the basis before the sale consumes it.
        let entry = average_entry_price(&self.trading.transactions, symbol);
        let result =
            self.trading_engine
                .sell(&mut self.trading, symbol, quantity, price, &bonuses.trade, now);

        let mut events = Vec::new();
        if result.success {
            let execution_price = result.execution_price.unwrap_or(price);
            let realized = Self::realized_against(entry, quantity, execution_price);
            self.award_trade_xp(realized, quantity * execution_price, &bonuses, &mut events);
        }
        Ok((result, events))
    }

    /// Place a stop-loss or take-profit order at the current holdings.
    pub fn place_order(
        &mut self,
        symbol: &str,
        kind: OrderKind,
        trigger_price: f64,
        quantity: f64,
    ) -> Result<OrderId> {
        self.price_of(symbol)?;
        let now = self.now();
        self.trading_engine
            .place_order(&mut self.trading, symbol, kind, trigger_price, quantity, now)
    }

    pub fn cancel_order(&mut self, id: OrderId) -> Result<()> {
        self.trading_engine.cancel_order(&mut self.trading, id)
    }

    // =========================================================================
    // Mining actions
    // =========================================================================

    pub fn buy_rack(&mut self, model_id: &str) -> Result<RackId> {
        self.mining_engine.buy_rack(
            &mut self.mining,
            &mut self.trading.balance,
            &self.catalog,
            model_id,
        )
    }

    pub fn buy_miner(&mut self, model_id: &str, rack_id: RackId) -> Result<MinerId> {
        let hashrate_bonus = self.bonuses().mining_efficiency;
        self.mining_engine.buy_miner(
            &mut self.mining,
            &mut self.trading.balance,
            &self.catalog,
            model_id,
            rack_id,
            hashrate_bonus,
        )
    }

    pub fn toggle_miner(&mut self, rack_id: RackId, slot: usize) -> Result<bool> {
        self.mining_engine.toggle_miner(&mut self.mining, rack_id, slot)
    }

    pub fn repair_miner(&mut self, rack_id: RackId, slot: usize) -> Result<f64> {
        self.mining_engine
            .repair_miner(&mut self.mining, &mut self.trading.balance, rack_id, slot)
    }

    /// Sell the whole mined accumulator at the mined symbol's current price.
    /// Returns the proceeds and the XP events the sale produced.
    pub fn sell_mined(&mut self) -> Result<(f64, Vec<TickEvent>)> {
        let symbol = self.config.mined_symbol.clone();
        let price = self.price_of(&symbol)?;
        let proceeds =
            self.mining_engine
                .sell_mined(&mut self.mining, &mut self.trading.balance, price);

        let mut events = Vec::new();
        if proceeds > 0.0 {
            let bonuses = self.bonuses();
            let raw = proceeds * MINED_SALE_XP_PER_CURRENCY;
            let outcome =
                self.progression_engine
                    .add_xp(&mut self.progression, raw, 1.0 + bonuses.trade.xp_bonus);
            Self::push_xp_events(outcome, XpSource::MinedSale, &mut events);
        }
        Ok((proceeds, events))
    }

    // =========================================================================
    // Progression actions
    // =========================================================================

    /// Record a quiz answer. Correct answers award XP scaled by difficulty
    /// (1-3) and grow the streak; wrong answers reset it.
    pub fn answer_quiz(&mut self, correct: bool, difficulty: f64) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if !correct {
            self.progression_engine.record_loss(&mut self.progression);
            return events;
        }
        let bonuses = self.bonuses();
        let breakdown = self.progression_engine.quiz_xp(
            self.progression.streak,
            difficulty,
            1.0 + bonuses.trade.xp_bonus,
        );
        let outcome =
            self.progression_engine
                .add_xp(&mut self.progression, breakdown.total as f64, 1.0);
        Self::push_xp_events(outcome, XpSource::Quiz, &mut events);
        self.progression_engine.record_win(&mut self.progression);
        events
    }

    /// Spend skill points on a catalog skill.
    pub fn unlock_skill(&mut self, id: &str) -> Result<()> {
        let cost = self
            .catalog
            .skill(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?
            .cost;
        self.progression_engine
            .unlock_skill(&mut self.progression, id, cost)?;
        info!(skill = id, cost, "skill unlocked");
        Ok(())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Capture the full world state.
    ///
    /// The market's random streams are not part of the snapshot; a restored
    /// world continues from the captured prices with freshly seeded streams,
    /// which is the intended restart semantic.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            market: self.market.state().clone(),
            trading: self.trading.clone(),
            mining: self.mining.clone(),
            progression: self.progression.clone(),
        }
    }

    /// Replace the full world state from a snapshot.
    pub fn restore(&mut self, snapshot: WorldSnapshot) {
        self.tick = snapshot.tick;
        self.market.restore(snapshot.market);
        self.trading = snapshot.trading;
        self.mining = snapshot.mining;
        self.progression = snapshot.progression;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn now(&self) -> Timestamp {
        let tick_millis = (self.config.tick_seconds * 1000.0).max(1.0) as u64;
        self.tick * tick_millis
    }

    fn bonuses(&self) -> Bonuses {
        aggregate_bonuses(&self.progression, &self.catalog)
    }

    fn price_of(&self, symbol: &str) -> Result<f64> {
        self.market
            .price(symbol)
            .ok_or_else(|| CoreError::NotFound(symbol.to_string()))
    }

    /// Realized pnl of a sale against the position's entry basis. Sales with
    /// no open basis count as flat.
    fn realized_against(entry: Option<f64>, quantity: f64, execution_price: f64) -> f64 {
        match entry {
            Some(price) => (execution_price - price) * quantity,
            None => 0.0,
        }
    }

    /// Streak update, XP formula, and application for one realized trade.
    /// A losing trade resets the streak before the formula runs, so it gets
    /// no streak bonus; a non-losing one banks its bonus and then extends
    /// the streak.
    fn award_trade_xp(
        &mut self,
        realized_pnl: f64,
        notional: f64,
        bonuses: &Bonuses,
        events: &mut Vec<TickEvent>,
    ) {
        if realized_pnl < 0.0 {
            self.progression_engine.record_loss(&mut self.progression);
        }

        let total_capital = self.net_worth();
        let risk = if total_capital > 0.0 {
            notional / total_capital
        } else {
            0.0
        };
        let breakdown = self.progression_engine.trade_xp(
            risk,
            self.progression.streak,
            1.0 + bonuses.trade.xp_bonus,
            bonuses.trade.commission_reduction,
        );
        let outcome =
            self.progression_engine
                .add_xp(&mut self.progression, breakdown.total as f64, 1.0);
        Self::push_xp_events(outcome, XpSource::Trade, events);

        if realized_pnl >= 0.0 {
            self.progression_engine.record_win(&mut self.progression);
        }
    }

    fn push_xp_events(outcome: XpOutcome, source: XpSource, events: &mut Vec<TickEvent>) {
        if outcome.applied > 0 {
            events.push(TickEvent::XpAwarded {
                amount: outcome.applied,
                source,
            });
        }
        if let Some(level) = outcome.new_level {
            events.push(TickEvent::LeveledUp {
                level,
                skill_points_gained: outcome.skill_points_gained,
            });
        }
    }
}
