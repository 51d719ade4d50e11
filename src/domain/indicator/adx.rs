//! ADX (Average Directional Index).
//!
//! +DM = up move when it exceeds the down move and is positive, else 0
//! -DM = down move when it exceeds the up move and is positive, else 0
//! TR, +DM and -DM are Wilder-smoothed over n bars starting from bar 1.
//! +DI / -DI = 100 * smoothed DM / smoothed TR
//! DX = 100 * |+DI - -DI| / (+DI + -DI), 0 when there is no range
//! ADX = mean of the first n DX values, then Wilder-smoothed.
//!
//! Warmup: 2n - 1 bars.

use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    let len = bars.len();
    let mut out = vec![f64::NAN; len];
    if period == 0 || len < 2 * period {
        return out;
    }

    let mut tr = vec![0.0; len];
    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];
    for i in 1..len {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        tr[i] = bars[i].true_range(bars[i - 1].close);
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let n = period as f64;
    let mut s_tr: f64 = tr[1..=period].iter().sum();
    let mut s_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut s_minus: f64 = minus_dm[1..=period].iter().sum();

    let mut dx = vec![f64::NAN; len];
    for i in period..len {
        if i > period {
            s_tr = s_tr - s_tr / n + tr[i];
            s_plus = s_plus - s_plus / n + plus_dm[i];
            s_minus = s_minus - s_minus / n + minus_dm[i];
        }
        dx[i] = directional_index(s_tr, s_plus, s_minus);
    }

    let first = 2 * period - 1;
    let mut adx = dx[period..=first].iter().sum::<f64>() / n;
    out[first] = adx;
    for i in (first + 1)..len {
        adx = (adx * (n - 1.0) + dx[i]) / n;
        out[i] = adx;
    }
    out
}

fn directional_index(s_tr: f64, s_plus: f64, s_minus: f64) -> f64 {
    if s_tr == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * s_plus / s_tr;
    let minus_di = 100.0 * s_minus / s_tr;
    let sum = plus_di + minus_di;
    if sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / sum
    }
}
