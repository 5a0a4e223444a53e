//! The market engine: per-instrument candle advancement, trend/phase
//! derivation, and event lifecycle.

use crate::events::EventGenerator;
use crate::generator::generate_next_candle;
use crate::indicators;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use types::{
    ActiveEvent, BollingerOutput, Candle, InstrumentState, MacdOutput, MarketEvent, MarketState,
    Symbol, Timestamp, TradeSignal, BASE_VOLATILITY, MAX_CANDLE_HISTORY, MAX_PRICE, MIN_PRICE,
};

/// What happened during one market tick, for the orchestrator to route.
#[derive(Debug, Clone, Default)]
pub struct MarketTick {
    /// Newly closed candle per symbol.
    pub candles: Vec<(Symbol, Candle)>,
    /// Events spawned this tick.
    pub started: Vec<MarketEvent>,
    /// Events whose lifetime ran out this tick.
    pub expired: Vec<MarketEvent>,
}

/// Bundle of indicator values for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: MacdOutput,
    pub bollinger: BollingerOutput,
    pub sma: f64,
    pub volatility: f64,
}

/// Synthesizes the market, one candle per instrument per tick.
///
/// Owns two independent seeded RNG streams (candle noise and event spawning)
/// so that replaying a seed reproduces the exact same market bit-for-bit.
pub struct MarketEngine {
    state: MarketState,
    rng: StdRng,
    events: EventGenerator,
}

impl MarketEngine {
    /// Seed the market with starting prices. Prices outside
    /// `[MIN_PRICE, MAX_PRICE]` are clamped at seed time.
    pub fn new(initial_prices: &[(Symbol, f64)], seed: u64) -> Self {
        let mut state = MarketState {
            global_volatility: BASE_VOLATILITY,
            ..Default::default()
        };
        for (symbol, price) in initial_prices {
            state.instruments.insert(
                symbol.clone(),
                InstrumentState::new(price.clamp(MIN_PRICE, MAX_PRICE)),
            );
        }
        Self {
            state,
            rng: StdRng::seed_from_u64(seed),
            events: EventGenerator::new(seed.wrapping_add(1)),
        }
    }

    /// Current market snapshot.
    pub fn state(&self) -> &MarketState {
        &self.state
    }

    /// Replace the market state from a snapshot. The event id counter resumes
    /// past any persisted event so ids stay unique.
    pub fn restore(&mut self, state: MarketState) {
        let max_event_id = state
            .active_events
            .iter()
            .map(|a| a.event.id.0)
            .max()
            .unwrap_or(0);
        self.events.resume_ids_after(max_event_id);
        self.state = state;
    }

    /// Current price for a symbol.
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.state.price(symbol)
    }

    /// Advance every instrument by one candle and run the event lifecycle.
    pub fn tick(&mut self, dt: f64, now: Timestamp) -> MarketTick {
        let mut report = MarketTick::default();

        // Sorted iteration keeps the RNG stream independent of map ordering.
        let mut symbols: Vec<Symbol> = self.state.instruments.keys().cloned().collect();
        symbols.sort();

        for symbol in &symbols {
            let (vol_multiplier, trend_bias) =
                EventGenerator::combined_impact(&self.state.active_events, symbol);
            let instrument = self
                .state
                .instruments
                .get_mut(symbol)
                .expect("symbol came from the map");

            let candle = generate_next_candle(
                &mut self.rng,
                instrument.last_close(),
                BASE_VOLATILITY,
                vol_multiplier,
                trend_bias,
                dt,
                now,
            );

            instrument.price = candle.close;
            instrument.history.push(candle.clone());
            if instrument.history.len() > MAX_CANDLE_HISTORY {
                instrument.history.remove(0);
            }
            instrument.trend =
                indicators::determine_trend(candle.close, indicators::sma(&instrument.history, 20));

            report.candles.push((symbol.clone(), candle));
        }

        // Event lifetimes.
        for active in &mut self.state.active_events {
            active.ticks_left = active.ticks_left.saturating_sub(1);
        }
        let (alive, dead): (Vec<ActiveEvent>, Vec<ActiveEvent>) = self
            .state
            .active_events
            .drain(..)
            .partition(|a| a.ticks_left > 0);
        self.state.active_events = alive;
        report.expired = dead.into_iter().map(|a| a.event).collect();

        if let Some(event) = self.events.try_spawn(self.state.active_events.len()) {
            info!(name = %event.name, duration = event.duration, "market event spawned");
            self.state.active_events.push(ActiveEvent {
                ticks_left: event.duration,
                event: event.clone(),
            });
            report.started.push(event);
        }

        // Derived globals: realized volatility feeds the phase classifier.
        self.state.global_volatility = self.average_volatility(&symbols);
        if let Some(reference) = symbols.first() {
            let instrument = &self.state.instruments[reference];
            self.state.phase = indicators::determine_phase(
                indicators::rsi(&instrument.history, 14),
                self.state.global_volatility,
                instrument.trend,
            );
        }

        debug!(
            candles = report.candles.len(),
            active_events = self.state.active_events.len(),
            phase = ?self.state.phase,
            "market tick"
        );
        report
    }

    /// Indicator bundle for a symbol, or `None` for unknown symbols.
    pub fn technical_indicators(&self, symbol: &str) -> Option<TechnicalIndicators> {
        let instrument = self.state.instruments.get(symbol)?;
        let history = &instrument.history;
        Some(TechnicalIndicators {
            rsi: indicators::rsi(history, 14),
            macd: indicators::macd(history),
            bollinger: indicators::bollinger(history, 20, 2.0),
            sma: indicators::sma(history, 20),
            volatility: indicators::historical_volatility(history, 20),
        })
    }

    /// Buy/sell/neutral hint for a symbol.
    pub fn trade_signal(&self, symbol: &str) -> Option<TradeSignal> {
        let ind = self.technical_indicators(symbol)?;
        Some(indicators::trade_signal(ind.rsi, ind.macd.histogram))
    }

    fn average_volatility(&self, symbols: &[Symbol]) -> f64 {
        if symbols.is_empty() {
            return BASE_VOLATILITY;
        }
        let sum: f64 = symbols
            .iter()
            .map(|s| indicators::historical_volatility(&self.state.instruments[s].history, 20))
            .sum();
        sum / symbols.len() as f64
    }
}
