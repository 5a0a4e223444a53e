//! World configuration.

use types::Symbol;

/// Everything needed to build a reproducible world.
///
/// The same config always produces the same world: the market is seeded from
/// `seed` and nothing else in the pipeline draws randomness.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Instruments and their seed prices.
    pub symbols: Vec<(Symbol, f64)>,
    /// Master seed for the market's random streams.
    pub seed: u64,
    pub starting_balance: f64,
    /// Electricity tariff per watt-second.
    pub cost_per_watt: f64,
    /// Simulated seconds covered by one tick.
    pub tick_seconds: f64,
    /// Instrument whose price values mined coin when it is sold.
    pub mined_symbol: Symbol,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                ("BTC".to_string(), 45_000.0),
                ("ETH".to_string(), 2_500.0),
                ("ADA".to_string(), 0.8),
            ],
            seed: 42,
            starting_balance: 10_000.0,
            cost_per_watt: 0.0001,
            tick_seconds: 1.0,
            mined_symbol: "BTC".to_string(),
        }
    }
}

impl WorldConfig {
    pub fn with_symbols(mut self, symbols: Vec<(Symbol, f64)>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_starting_balance(mut self, balance: f64) -> Self {
        self.starting_balance = balance;
        self
    }

    pub fn with_cost_per_watt(mut self, cost_per_watt: f64) -> Self {
        self.cost_per_watt = cost_per_watt;
        self
    }

    pub fn with_tick_seconds(mut self, tick_seconds: f64) -> Self {
        self.tick_seconds = tick_seconds;
        self
    }

    pub fn with_mined_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.mined_symbol = symbol.into();
        self
    }
}
