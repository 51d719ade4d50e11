//! Bollinger Bands.
//!
//! Middle = SMA(n) of close, Upper/Lower = Middle ± k * σ where σ is the
//! population standard deviation of the same window.
//!
//! Default: k = 2. Warmup: n - 1 bars.

use crate::domain::indicator::Band;
use crate::domain::indicator_helpers::{closes, rolling_mean, rolling_std};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_STD: f64 = 2.0;

pub fn calculate_bollinger(bars: &[OhlcvBar], period: usize, std_dev: f64, band: Band) -> Vec<f64> {
    let prices = closes(bars);
    let middle = rolling_mean(&prices, period);
    if band == Band::Middle {
        return middle;
    }
    let sigma = rolling_std(&prices, period);
    let sign = if band == Band::Upper { 1.0 } else { -1.0 };
    middle
        .iter()
        .zip(&sigma)
        .map(|(m, s)| m + sign * std_dev * s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::test_bars::{from_closes, walk};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn known_bands() {
        let bars = from_closes(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // mean 5, population σ 2
        assert_relative_eq!(calculate_bollinger(&bars, 8, 2.0, Band::Middle)[7], 5.0);
        assert_relative_eq!(calculate_bollinger(&bars, 8, 2.0, Band::Upper)[7], 9.0);
        assert_relative_eq!(calculate_bollinger(&bars, 8, 1.5, Band::Lower)[7], 2.0);
    }

    #[test]
    fn bands_are_ordered() {
        let bars = walk(100);
        let up = calculate_bollinger(&bars, 20, 2.0, Band::Upper);
        let mid = calculate_bollinger(&bars, 20, 2.0, Band::Middle);
        let low = calculate_bollinger(&bars, 20, 2.0, Band::Lower);
        for i in 19..bars.len() {
            assert!(up[i] >= mid[i] && mid[i] >= low[i]);
        }
    }

    proptest! {
        #[test]
        fn constant_series_collapses_bands(
            value in 0.01f64..10_000.0,
            period in 1usize..50,
            std_dev in 0.5f64..3.0,
            extra in 0usize..30,
        ) {
            let bars = from_closes(&vec![value; period + extra]);
            let mid = calculate_bollinger(&bars, period, std_dev, Band::Middle);
            let up = calculate_bollinger(&bars, period, std_dev, Band::Upper);
            let low = calculate_bollinger(&bars, period, std_dev, Band::Lower);
            for band in [&mid, &up, &low] {
                prop_assert!(band[..period - 1].iter().all(|v| v.is_nan()));
            }
            for i in period - 1..bars.len() {
                assert_relative_eq!(mid[i], value, max_relative = 1e-12);
                assert_relative_eq!(up[i], mid[i], max_relative = 1e-9);
                assert_relative_eq!(low[i], mid[i], max_relative = 1e-9);
            }
        }
    }
}
