//! OHLCV bar representation and price-series normalisation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Inclusive date window; an open end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Bring loaded bars into the shape the engine relies on: no NaN closes,
/// strictly ascending unique dates, restricted to `range`.
///
/// When a date appears more than once the last bar for it wins.
pub fn normalize_bars(mut bars: Vec<OhlcvBar>, range: &DateRange) -> Vec<OhlcvBar> {
    bars.retain(|b| b.close.is_finite() && range.contains(b.date));
    // stable sort keeps file order among equal dates
    bars.sort_by_key(|b| b.date);

    let mut out: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    let mut duplicates = 0usize;
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => {
                *last = bar;
                duplicates += 1;
            }
            _ => out.push(bar),
        }
    }
    if duplicates > 0 {
        tracing::warn!(duplicates, "dropped bars with duplicate dates");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: f64) -> OhlcvBar {
        OhlcvBar {
            date,
            open: close,
            high: close + 10.0,
            low: close - 10.0,
            close,
            volume: 50_000.0,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn true_range_hl_dominates() {
        let b = bar(d(2024, 1, 15), 100.0);
        // high-low=20, |110-100|=10, |90-100|=10 → 20
        assert!((b.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let b = bar(d(2024, 1, 15), 100.0);
        // |110-70| = 40
        assert!((b.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let b = bar(d(2024, 1, 15), 100.0);
        // |90-130| = 40
        assert!((b.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn date_range_is_inclusive() {
        let r = DateRange::new(Some(d(2024, 1, 2)), Some(d(2024, 1, 4)));
        assert!(!r.contains(d(2024, 1, 1)));
        assert!(r.contains(d(2024, 1, 2)));
        assert!(r.contains(d(2024, 1, 4)));
        assert!(!r.contains(d(2024, 1, 5)));
        assert!(DateRange::default().contains(d(1990, 6, 1)));
    }

    #[test]
    fn normalize_sorts_filters_and_dedupes() {
        let bars = vec![
            bar(d(2024, 1, 3), 103.0),
            bar(d(2024, 1, 1), 101.0),
            bar(d(2024, 1, 2), f64::NAN),
            bar(d(2024, 1, 3), 203.0),
            bar(d(2024, 1, 5), 105.0),
        ];
        let out = normalize_bars(bars, &DateRange::new(None, Some(d(2024, 1, 4))));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, d(2024, 1, 1));
        assert_eq!(out[1].date, d(2024, 1, 3));
        assert_eq!(out[1].close, 203.0);
    }
}
