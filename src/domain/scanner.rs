//! Signal scanning.
//!
//! Walks the dataset chronologically and records a `Signal` at every bar
//! where the condition expression holds. Indicator columns must already be
//! present in the dataset (see `Dataset::ensure`).

use crate::domain::condition::{Comparison, Condition};
use crate::domain::condition_eval::evaluate;
use crate::domain::dataset::Dataset;
use crate::domain::indicator::{Indicator, IndicatorSpec};
use crate::domain::result::{Signal, round_dp};
use std::collections::BTreeMap;

/// Largest `period`/`slow` parameter referenced on either side of any condition.
pub fn min_lookback(conditions: &[Condition]) -> usize {
    conditions
        .iter()
        .flat_map(Condition::indicator_specs)
        .map(IndicatorSpec::lookback)
        .max()
        .unwrap_or(0)
}

/// First bar index the scan visits; never 0 so crossings have a prior bar.
pub fn scan_start(conditions: &[Condition]) -> usize {
    min_lookback(conditions).max(1)
}

pub fn scan(dataset: &Dataset, conditions: &[Condition]) -> Vec<Signal> {
    let snapshot_specs: Vec<&IndicatorSpec> = conditions
        .iter()
        .flat_map(|c| {
            let left = (c.indicator.indicator != Indicator::Price).then_some(&c.indicator);
            let right = match &c.compare {
                Comparison::Indicator(spec) => Some(spec),
                _ => None,
            };
            left.into_iter().chain(right)
        })
        .collect();
    let snapshot_columns: Vec<String> = snapshot_specs
        .iter()
        .filter_map(|spec| spec.column_name().ok())
        .collect();

    let mut signals = Vec::new();
    for index in scan_start(conditions)..dataset.len() {
        if !evaluate(dataset, index, conditions) {
            continue;
        }
        let mut indicator_values = BTreeMap::new();
        for name in &snapshot_columns {
            let value = dataset
                .column(name)
                .and_then(|col| col.get(index).copied())
                .filter(|v| v.is_finite());
            if let Some(v) = value {
                indicator_values.insert(name.clone(), round_dp(v, 4));
            }
        }
        let bar = &dataset.bars()[index];
        signals.push(Signal {
            date: bar.date,
            price: round_dp(bar.close, 4),
            indicator_values,
            outcomes: Vec::new(),
        });
    }
    signals
}
