//! Technical indicators over candle history.
//!
//! All indicators are pure functions over a candle slice ordered oldest to
//! newest. When history is shorter than the requested period each function
//! degrades gracefully (last close, neutral RSI, widened bands) instead of
//! returning nothing — callers render these values every tick from the very
//! first candle.

use types::{BollingerOutput, Candle, MacdOutput, MarketPhase, TradeSignal, Trend, BASE_VOLATILITY};

/// Simple moving average of closes over the trailing `period`.
///
/// Falls back to the last close when history is short, and 0.0 on empty
/// history.
pub fn sma(candles: &[Candle], period: usize) -> f64 {
    if candles.is_empty() || period == 0 {
        return 0.0;
    }
    if candles.len() < period {
        return candles[candles.len() - 1].close;
    }
    let sum: f64 = candles.iter().rev().take(period).map(|c| c.close).sum();
    sum / period as f64
}

/// Exponential moving average with smoothing `k = 2 / (period + 1)`, seeded
/// by the first close. Falls back to the last close when history is short.
pub fn ema(candles: &[Candle], period: usize) -> f64 {
    if candles.is_empty() || period == 0 {
        return 0.0;
    }
    if candles.len() < period {
        return candles[candles.len() - 1].close;
    }
    let k = 2.0 / (period as f64 + 1.0);
    candles
        .iter()
        .skip(1)
        .fold(candles[0].close, |prev, c| c.close * k + prev * (1.0 - k))
}

/// Relative Strength Index over `period` close-to-close changes.
///
/// Simple (non-smoothed) averages of gains and losses, scaled via
/// `100 - 100 / (1 + RS)` and clamped to [0, 100]. Returns a neutral 50
/// when history is too short.
pub fn rsi(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return 50.0;
    }
    let window = &candles[candles.len() - (period + 1)..];
    let (gains, losses) = window.windows(2).fold((0.0, 0.0), |(g, l), w| {
        let change = w[1].close - w[0].close;
        if change > 0.0 {
            (g + change, l)
        } else {
            (g, l - change)
        }
    });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// MACD line (EMA12 - EMA26) with an approximated signal line.
///
/// The signal line is `0.85 * MACD` rather than a true EMA of the MACD
/// series; the game balance is tuned against this value. A real EMA-of-MACD
/// can be substituted here without changing any caller.
pub fn macd(candles: &[Candle]) -> MacdOutput {
    let line = ema(candles, 12) - ema(candles, 26);
    let signal = line * 0.85;
    MacdOutput {
        macd: line,
        signal,
        histogram: line - signal,
    }
}

/// Bollinger bands: SMA(period) ± `mult` standard deviations of closes.
///
/// With short history the bands widen to ±10% of the middle.
pub fn bollinger(candles: &[Candle], period: usize, mult: f64) -> BollingerOutput {
    let middle = sma(candles, period);
    if candles.len() < period || period == 0 {
        return BollingerOutput {
            upper: middle * 1.1,
            middle,
            lower: middle * 0.9,
        };
    }
    let window = &candles[candles.len() - period..];
    let variance = window
        .iter()
        .map(|c| (c.close - middle).powi(2))
        .sum::<f64>()
        / period as f64;
    let std_dev = variance.sqrt();
    BollingerOutput {
        upper: middle + std_dev * mult,
        middle,
        lower: middle - std_dev * mult,
    }
}

/// Historical volatility: standard deviation of simple returns over the
/// trailing `period`, floored at the base volatility.
pub fn historical_volatility(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period || period < 2 {
        return BASE_VOLATILITY;
    }
    let window = &candles[candles.len() - period..];
    let returns: Vec<f64> = window
        .windows(2)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    variance.sqrt().max(BASE_VOLATILITY)
}

/// Trend classification: up/down when price sits more than 0.5% above/below
/// its moving average.
pub fn determine_trend(price: f64, sma_price: f64) -> Trend {
    if sma_price <= 0.0 {
        return Trend::Neutral;
    }
    let change_pct = (price - sma_price) / sma_price * 100.0;
    if change_pct > 0.5 {
        Trend::Up
    } else if change_pct < -0.5 {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

/// Coarse market phase classifier. A mood label for presentation; trading
/// logic never reads it.
pub fn determine_phase(rsi_value: f64, volatility: f64, trend: Trend) -> MarketPhase {
    if rsi_value > 70.0 && trend == Trend::Up {
        MarketPhase::BullRun
    } else if rsi_value < 30.0 && trend == Trend::Down {
        MarketPhase::BearMarket
    } else if volatility > BASE_VOLATILITY * 2.0 {
        MarketPhase::Crash
    } else {
        MarketPhase::Accumulation
    }
}

/// Buy/sell hint from RSI extremes confirmed by the MACD histogram.
pub fn trade_signal(rsi_value: f64, macd_histogram: f64) -> TradeSignal {
    if rsi_value < 30.0 && macd_histogram > 0.0 {
        TradeSignal::Buy
    } else if rsi_value > 70.0 && macd_histogram < 0.0 {
        TradeSignal::Sell
    } else {
        TradeSignal::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to build candles from close prices.
    fn make_candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: i as u64,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn sma_averages_trailing_window() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        // (12 + 13 + 14) / 3 = 13
        assert!((sma(&candles, 3) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn sma_falls_back_to_last_close() {
        let candles = make_candles(&[10.0, 11.0]);
        assert!((sma(&candles, 5) - 11.0).abs() < 1e-9);
        assert_eq!(sma(&[], 5), 0.0);
    }

    #[test]
    fn ema_weights_recent_closes() {
        let candles = make_candles(&[10.0, 10.0, 10.0, 10.0, 20.0]);
        let e = ema(&candles, 3);
        // EMA must sit between the flat history and the final spike,
        // closer to the spike than the SMA of the full series.
        assert!(e > 12.0 && e < 20.0);
    }

    #[test]
    fn rsi_neutral_when_short() {
        let candles = make_candles(&[10.0, 11.0]);
        assert_eq!(rsi(&candles, 14), 50.0);
    }

    #[test]
    fn rsi_hits_100_on_pure_gains() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        assert!((rsi(&candles, 14) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_low_on_pure_losses() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 - i as f64).collect();
        let candles = make_candles(&closes);
        assert!(rsi(&candles, 14) < 1.0);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0).collect();
        let candles = make_candles(&closes);
        let out = macd(&candles);
        assert!((out.histogram - (out.macd - out.signal)).abs() < 1e-9);
        assert!((out.signal - out.macd * 0.85).abs() < 1e-9);
    }

    #[test]
    fn bollinger_bands_bracket_the_mean() {
        let closes: Vec<f64> = (0..25).map(|i| 50.0 + (i % 5) as f64).collect();
        let candles = make_candles(&closes);
        let bands = bollinger(&candles, 20, 2.0);
        assert!(bands.upper > bands.middle);
        assert!(bands.lower < bands.middle);
    }

    #[test]
    fn bollinger_fallback_widens_to_ten_percent() {
        let candles = make_candles(&[100.0, 101.0]);
        let bands = bollinger(&candles, 20, 2.0);
        assert!((bands.upper - bands.middle * 1.1).abs() < 1e-9);
        assert!((bands.lower - bands.middle * 0.9).abs() < 1e-9);
    }

    #[test]
    fn trend_uses_half_percent_band() {
        assert_eq!(determine_trend(100.6, 100.0), Trend::Up);
        assert_eq!(determine_trend(99.4, 100.0), Trend::Down);
        assert_eq!(determine_trend(100.3, 100.0), Trend::Neutral);
    }

    #[test]
    fn phase_classifier_thresholds() {
        assert_eq!(
            determine_phase(75.0, BASE_VOLATILITY, Trend::Up),
            MarketPhase::BullRun
        );
        assert_eq!(
            determine_phase(25.0, BASE_VOLATILITY, Trend::Down),
            MarketPhase::BearMarket
        );
        assert_eq!(
            determine_phase(50.0, BASE_VOLATILITY * 3.0, Trend::Neutral),
            MarketPhase::Crash
        );
        assert_eq!(
            determine_phase(50.0, BASE_VOLATILITY, Trend::Neutral),
            MarketPhase::Accumulation
        );
    }

    #[test]
    fn trade_signal_needs_confirmation() {
        assert_eq!(trade_signal(25.0, 1.0), TradeSignal::Buy);
        assert_eq!(trade_signal(75.0, -1.0), TradeSignal::Sell);
        // RSI extreme alone is not enough.
        assert_eq!(trade_signal(25.0, -1.0), TradeSignal::Neutral);
        assert_eq!(trade_signal(50.0, 1.0), TradeSignal::Neutral);
    }
}
