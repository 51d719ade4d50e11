//! Per-run working dataset: price bars plus computed indicator columns.
//!
//! A `Dataset` is owned by exactly one analysis invocation. Indicator columns
//! are appended while conditions are prepared and read during the scan.

use crate::domain::error::RetrocastError;
use crate::domain::indicator::IndicatorSpec;
use crate::domain::indicator_helpers::closes;
use crate::domain::naming::PRICE_COLUMN;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Dataset {
    bars: Vec<OhlcvBar>,
    closes: Vec<f64>,
    columns: HashMap<String, Vec<f64>>,
    date_index: HashMap<NaiveDate, usize>,
}

impl Dataset {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Self {
            closes: closes(&bars),
            bars,
            columns: HashMap::new(),
            date_index,
        }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar_index(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// Compute the column for `spec` unless it already exists; returns its name.
    pub fn ensure(&mut self, spec: &IndicatorSpec) -> Result<String, RetrocastError> {
        let name = spec.column_name()?;
        if name == PRICE_COLUMN || self.columns.contains_key(&name) {
            return Ok(name);
        }
        let series = spec.resolve()?.calculate(&self.bars);
        tracing::debug!(column = %name, warmup = series.warmup(), "computed indicator column");
        self.columns.insert(name.clone(), series.values);
        Ok(name)
    }

    #[cfg(test)]
    pub(crate) fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.columns.insert(name.into(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        if name == PRICE_COLUMN {
            return Some(&self.closes);
        }
        self.columns.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::Indicator;
    use crate::domain::indicator_helpers::test_bars::{from_closes, walk};

    #[test]
    fn date_index_maps_every_bar() {
        let ds = Dataset::new(from_closes(&[1.0, 2.0, 3.0]));
        assert_eq!(ds.len(), 3);
        let third = ds.bars()[2].date;
        assert_eq!(ds.bar_index(third), Some(2));
        assert_eq!(ds.bar_index(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()), None);
    }

    #[test]
    fn close_column_is_always_present() {
        let ds = Dataset::new(from_closes(&[4.0, 5.0]));
        assert_eq!(ds.column("close"), Some(&[4.0, 5.0][..]));
        assert!(ds.column("SMA_20").is_none());
    }

    #[test]
    fn ensure_computes_once_and_names_column() {
        let mut ds = Dataset::new(walk(30));
        let spec = IndicatorSpec::new(Indicator::Sma).with_param("period", 5u64);
        assert_eq!(ds.ensure(&spec).unwrap(), "SMA_5");
        ds.insert_column("SMA_5", vec![0.0; 30]);
        ds.ensure(&spec).unwrap();
        assert_eq!(ds.column("SMA_5").unwrap()[0], 0.0);
    }

    #[test]
    fn ensure_price_adds_no_column() {
        let mut ds = Dataset::new(walk(5));
        assert_eq!(ds.ensure(&IndicatorSpec::new(Indicator::Price)).unwrap(), "close");
        assert!(ds.columns.is_empty());
    }

    #[test]
    fn ensure_propagates_parameter_errors() {
        let mut ds = Dataset::new(walk(5));
        let err = ds.ensure(&IndicatorSpec::new(Indicator::Rsi)).unwrap_err();
        assert!(matches!(err, RetrocastError::InvalidParameters { .. }));
    }
}
