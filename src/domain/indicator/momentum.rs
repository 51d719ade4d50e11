//! Momentum-style ratios: percentage price change and relative volume.

use crate::domain::indicator_helpers::rolling_mean;
use crate::domain::ohlcv::OhlcvBar;

/// (close[t] - close[t-n]) / close[t-n] * 100; undefined for the first n bars
/// and wherever close[t-n] is zero.
pub fn calculate_price_change(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; bars.len()];
    if period == 0 {
        return out;
    }
    for i in period..bars.len() {
        let base = bars[i - period].close;
        if base != 0.0 {
            out[i] = (bars[i].close - base) / base * 100.0;
        }
    }
    out
}

/// volume[t] / mean(volume over the last n bars).
pub fn calculate_volume_ratio(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let avg = rolling_mean(&volumes, period);
    volumes
        .iter()
        .zip(&avg)
        .map(|(v, a)| {
            let ratio = v / a;
            if ratio.is_finite() { ratio } else { f64::NAN }
        })
        .collect()
}
