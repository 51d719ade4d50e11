//! Simple and exponential moving averages of close.
//!
//! SMA(n) = mean of the last n closes.
//! EMA(n): alpha = 2 / (n + 1), seeded with the first close and reported
//! once n closes have been seen.
//!
//! Warmup: n - 1 bars for both.

use crate::domain::indicator_helpers::{closes, ewm, rolling_mean};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    rolling_mean(&closes(bars), period)
}

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    ema_of(&closes(bars), period)
}

/// EMA over an arbitrary series; leading NaNs are skipped.
pub fn ema_of(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm(values, 2.0 / (period as f64 + 1.0), period)
}
