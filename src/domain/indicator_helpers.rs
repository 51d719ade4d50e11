//! Shared window and smoothing primitives for indicator calculations.
//!
//! Every helper returns a vector aligned with its input. Positions without a
//! full window of defined inputs are NaN.

use crate::domain::ohlcv::OhlcvBar;

pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

fn rolling(values: &[f64], period: usize, reduce: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = reduce(window);
    }
    out
}

pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Population standard deviation (divides by N).
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let variance = w
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        variance.sqrt()
    })
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Recursive exponential weighting: avg = avg + alpha * (x - avg).
///
/// The recursion is seeded with the first defined input and an output is
/// only emitted once `min_periods` defined inputs have been seen. Leading
/// NaNs (e.g. the warmup of an upstream indicator) are skipped.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let mut avg: Option<f64> = None;
    let mut seen = 0usize;

    for (i, &x) in values.iter().enumerate() {
        if !x.is_nan() {
            seen += 1;
            avg = Some(match avg {
                None => x,
                Some(prev) => prev + alpha * (x - prev),
            });
        }
        if seen >= min_periods.max(1) {
            if let Some(a) = avg {
                out[i] = a;
            }
        }
    }
    out
}

/// True range per bar; the first bar has no previous close and uses high - low.
pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

/// Wilder's average true range, seeded with the mean of the first `period`
/// true ranges.
pub fn calc_atr(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    let mut results = vec![f64::NAN; bars.len()];
    if period == 0 || bars.len() < period {
        return results;
    }

    let tr_values = true_ranges(bars);
    let seed: f64 = tr_values[..period].iter().sum::<f64>() / period as f64;
    results[period - 1] = seed;

    let mut prev_atr = seed;
    for i in period..bars.len() {
        let atr = (prev_atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        results[i] = atr;
        prev_atr = atr;
    }
    results
}
