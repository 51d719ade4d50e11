//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, started at its first defined value
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 for the line, plus signal - 1 for signal and histogram.

use crate::domain::indicator::MacdLine;
use crate::domain::indicator::moving_average::{calculate_ema, ema_of};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
    line: MacdLine,
) -> Vec<f64> {
    let ema_fast = calculate_ema(bars, fast);
    let ema_slow = calculate_ema(bars, slow);
    let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    if line == MacdLine::Line {
        return macd_line;
    }

    let signal_line = ema_of(&macd_line, signal_period);
    match line {
        MacdLine::Signal => signal_line,
        _ => macd_line
            .iter()
            .zip(&signal_line)
            .map(|(m, s)| m - s)
            .collect(),
    }
}
