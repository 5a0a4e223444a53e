//! Stochastic candle generation.
//!
//! One call produces one candle from the previous close via a log-normal
//! step: `close = open * exp(drift + vol * sqrt(dt) * z)` where `z` is a
//! standard normal deviate. The function is pure given the RNG, which is the
//! property the reproducibility tests rely on.

use rand::Rng;
use types::{Candle, Timestamp, MAX_PRICE, MIN_PRICE};

/// Chance that a candle opens with a gap from the previous close.
const GAP_CHANCE: f64 = 0.10;

/// Maximum gap size as a fraction of the previous close (±1%).
const GAP_SCALE: f64 = 0.02;

/// Base synthetic volume per candle.
const BASE_VOLUME: f64 = 500.0;

/// Random volume spread on top of the base.
const VOLUME_SPREAD: f64 = 1000.0;

/// Extra volume per unit of relative move size. Larger moves trade more.
const VOLUME_MOVE_SCALE: f64 = 20_000.0;

/// Draw a pair of independent standard normal deviates via the Box-Muller
/// transform from two uniform samples.
fn normal_pair<R: Rng>(rng: &mut R) -> (f64, f64) {
    // 1 - u keeps the argument of ln strictly positive.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * std::f64::consts::PI * u2;
    (r * theta.cos(), r * theta.sin())
}

fn clamp_price(price: f64) -> f64 {
    price.clamp(MIN_PRICE, MAX_PRICE)
}

/// Generate the next candle from the previous close.
///
/// * `base_volatility` - per-tick volatility before event amplification
/// * `vol_multiplier` - combined multiplier from active market events
/// * `trend_bias` - directional drift in [-1, 1], scaled by `dt`
/// * `dt` - time step in tick units (1.0 for a standard tick)
///
/// Guarantees `low <= min(open, close) <= max(open, close) <= high` and that
/// every price lies inside `[MIN_PRICE, MAX_PRICE]`.
pub fn generate_next_candle<R: Rng>(
    rng: &mut R,
    last_close: f64,
    base_volatility: f64,
    vol_multiplier: f64,
    trend_bias: f64,
    dt: f64,
    timestamp: Timestamp,
) -> Candle {
    let vol = base_volatility * vol_multiplier;

    // Occasional open gap, at most ±1% of the previous close.
    let open = if rng.gen::<f64>() < GAP_CHANCE {
        clamp_price(last_close * (1.0 + (rng.gen::<f64>() - 0.5) * GAP_SCALE))
    } else {
        clamp_price(last_close)
    };

    let (z_close, z_wick) = normal_pair(rng);
    let drift = trend_bias * dt;
    let close = clamp_price(open * (drift + vol * dt.sqrt() * z_close).exp());

    // Wick noise grows with both volatility and the realized move size.
    let rel_move = ((close - open) / open).abs();
    let wick_scale = vol + 0.5 * rel_move;
    let high = clamp_price(open.max(close) * (1.0 + rng.gen::<f64>() * wick_scale));
    let low = clamp_price(open.min(close) * (1.0 - rng.gen::<f64>() * wick_scale));

    // Volume: base draw plus a bonus for large moves, nudged by the second
    // normal deviate so quiet candles still vary.
    let volume =
        BASE_VOLUME + rng.gen::<f64>() * VOLUME_SPREAD + rel_move * VOLUME_MOVE_SCALE
            + z_wick.abs() * 10.0;

    Candle {
        timestamp,
        open,
        high: high.max(open.max(close)),
        low: low.min(open.min(close)),
        close,
        volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use types::BASE_VOLATILITY;

    #[test]
    fn same_seed_reproduces_same_candle() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let ca = generate_next_candle(&mut a, 45_000.0, BASE_VOLATILITY, 1.0, 0.0, 1.0, 0);
        let cb = generate_next_candle(&mut b, 45_000.0, BASE_VOLATILITY, 1.0, 0.0, 1.0, 0);
        assert_eq!(ca, cb);
    }

    #[test]
    fn ohlc_ordering_holds_over_many_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut close = 45_000.0;
        for i in 0..5_000 {
            let c = generate_next_candle(&mut rng, close, BASE_VOLATILITY, 3.0, 0.1, 1.0, i);
            assert!(c.high >= c.open.max(c.close), "high below body at tick {}", i);
            assert!(c.low <= c.open.min(c.close), "low above body at tick {}", i);
            assert!(c.close >= MIN_PRICE && c.close <= MAX_PRICE);
            assert!(c.low >= MIN_PRICE);
            assert!(c.volume > 0.0);
            close = c.close;
        }
    }

    #[test]
    fn price_floor_survives_a_crash_regime() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut close = 150.0;
        // Strong downward bias and heavy volatility must still respect the floor.
        for i in 0..2_000 {
            let c = generate_next_candle(&mut rng, close, BASE_VOLATILITY, 10.0, -1.0, 1.0, i);
            assert!(c.close >= MIN_PRICE);
            close = c.close;
        }
        assert_eq!(close, MIN_PRICE);
    }

    #[test]
    fn upward_bias_drifts_upward_on_average() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut close = 1_000.0;
        for i in 0..3_000 {
            close =
                generate_next_candle(&mut rng, close, BASE_VOLATILITY, 1.0, 0.01, 1.0, i).close;
        }
        assert!(close > 1_000.0);
    }
}
