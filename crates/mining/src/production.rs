//! Production, cost, and health analytics. Pure functions for display and
//! planning; the settlement math lives in [`crate::MiningEngine::tick`].

use crate::{DIFFICULTY_DIVISOR, REPAIR_COST_PER_PERCENT};
use types::{MinerHealth, MiningEfficiency, MiningRoi, ProductionMetrics};

/// Production rates at a given aggregate hashrate and coin price.
pub fn production_metrics(total_hashrate: f64, coin_price: f64) -> ProductionMetrics {
    let coin_per_second = total_hashrate / DIFFICULTY_DIVISOR;
    let coin_per_hour = coin_per_second * 3600.0;
    let coin_per_day = coin_per_hour * 24.0;
    ProductionMetrics {
        coin_per_second,
        coin_per_hour,
        coin_per_day,
        currency_per_second: coin_per_second * coin_price,
        currency_per_hour: coin_per_hour * coin_price,
        currency_per_day: coin_per_day * coin_price,
    }
}

/// Electricity cost for a full day at the given draw and tariff.
pub fn daily_electricity_cost(total_power: f64, cost_per_watt: f64) -> f64 {
    total_power * cost_per_watt * 86_400.0
}

/// Return-on-investment summary. `days_to_break_even` is infinite when the
/// farm runs at a loss.
pub fn roi(
    total_investment: f64,
    production: &ProductionMetrics,
    daily_electricity: f64,
) -> MiningRoi {
    let daily_profit = production.currency_per_day - daily_electricity;
    let days_to_break_even = if daily_profit > 0.0 && total_investment > 0.0 {
        total_investment / daily_profit
    } else {
        f64::INFINITY
    };
    let annual_roi = if total_investment > 0.0 {
        daily_profit * 365.0 / total_investment
    } else {
        0.0
    };
    MiningRoi {
        total_investment,
        daily_profit,
        monthly_profit: daily_profit * 30.0,
        days_to_break_even,
        annual_roi,
    }
}

/// Output per watt of draw. Zero draw yields zero efficiency.
pub fn efficiency(production: &ProductionMetrics, total_power: f64) -> MiningEfficiency {
    if total_power <= 0.0 {
        return MiningEfficiency::default();
    }
    MiningEfficiency {
        hash_per_watt: production.coin_per_day * DIFFICULTY_DIVISOR / total_power,
        currency_per_watt: production.currency_per_day / total_power,
    }
}

/// Cost to restore a miner from `condition` back to 100.
pub fn repair_cost(condition: f64) -> f64 {
    (100.0 - condition.clamp(0.0, 100.0)) * REPAIR_COST_PER_PERCENT
}

/// Display bucket for a miner's condition.
pub fn miner_health(condition: f64) -> MinerHealth {
    if condition <= 0.0 {
        MinerHealth::Broken
    } else if condition < 25.0 {
        MinerHealth::Critical
    } else if condition < 60.0 {
        MinerHealth::Degraded
    } else {
        MinerHealth::Healthy
    }
}
