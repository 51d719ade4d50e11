//! Rolling highest and lowest close.

use crate::domain::indicator_helpers::{closes, rolling_max, rolling_min};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_highest(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    rolling_max(&closes(bars), period)
}

pub fn calculate_lowest(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    rolling_min(&closes(bars), period)
}
