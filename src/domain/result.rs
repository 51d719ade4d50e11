//! Analysis output types.

use crate::domain::target::Direction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format used for `AnalysisResult::run_date`.
pub const RUN_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Round half away from zero to `dp` decimal places.
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// One target judged at one signal. All optional fields are `None` when the
/// history ends before the target's horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOutcome {
    pub target_id: String,
    pub days_forward: usize,
    pub threshold_pct: f64,
    pub direction: Direction,
    pub future_date: Option<NaiveDate>,
    pub future_price: Option<f64>,
    pub actual_change_pct: Option<f64>,
    /// Most favourable close-to-close move inside the window.
    pub max_change_pct: Option<f64>,
    pub hit: Option<bool>,
}

impl SignalOutcome {
    pub fn is_evaluable(&self) -> bool {
        self.hit.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub date: NaiveDate,
    pub price: f64,
    pub indicator_values: BTreeMap<String, f64>,
    pub outcomes: Vec<SignalOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStats {
    pub target_id: String,
    pub days_forward: usize,
    pub threshold_pct: f64,
    pub direction: Direction,
    pub total_evaluable: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub hit_rate_pct: f64,
    pub avg_change_pct: f64,
    pub median_change_pct: f64,
    pub max_change_pct: f64,
    pub min_change_pct: f64,
    pub std_dev: f64,
    pub percentile_5: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
    pub percentile_95: f64,
    pub distribution: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scenario_id: String,
    pub scenario_name: String,
    pub underlying: String,
    pub run_date: String,
    pub data_start: NaiveDate,
    pub data_end: NaiveDate,
    pub total_bars: usize,
    pub total_signals: usize,
    pub target_stats: Vec<TargetStats>,
    pub signals: Vec<Signal>,
}

impl AnalysisResult {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
