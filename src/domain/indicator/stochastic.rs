//! Stochastic oscillator.
//!
//! %K = 100 * (close - lowest_low(k)) / (highest_high(k) - lowest_low(k))
//! %D = SMA(d) of %K
//!
//! A window with no range (highest == lowest) yields NaN for %K.
//! Warmup: k - 1 bars for %K, k + d - 2 for %D.

use crate::domain::indicator::StochLine;
use crate::domain::indicator_helpers::{rolling_max, rolling_mean, rolling_min};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_K: usize = 14;
pub const DEFAULT_D: usize = 3;

pub fn calculate_stochastic(
    bars: &[OhlcvBar],
    k_period: usize,
    d_period: usize,
    line: StochLine,
) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let hh = rolling_max(&highs, k_period);
    let ll = rolling_min(&lows, k_period);

    let k: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| 100.0 * (bar.close - ll[i]) / (hh[i] - ll[i]))
        .collect();

    match line {
        StochLine::K => k,
        StochLine::D => rolling_mean(&k, d_period),
    }
}
