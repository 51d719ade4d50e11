//! Analysis pipeline.
//!
//! 1. Validate the scenario
//! 2. Load and normalise price bars through a `DataPort`
//! 3. Compute every referenced indicator column
//! 4. Scan for signals
//! 5. Evaluate targets at each signal
//! 6. Aggregate per-target statistics
//!
//! Each call owns its `Dataset`; nothing is shared between runs.

use crate::domain::dataset::Dataset;
use crate::domain::error::RetrocastError;
use crate::domain::ohlcv::{OhlcvBar, normalize_bars};
use crate::domain::result::{AnalysisResult, RUN_DATE_FORMAT};
use crate::domain::scanner::{scan, scan_start};
use crate::domain::scenario::Scenario;
use crate::domain::scenario_validation::validate_scenario;
use crate::domain::stats::aggregate;
use crate::domain::target::evaluate_targets;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Utc};
use std::time::Instant;

/// Fewest bars an analysis will run on after date filtering.
pub const MIN_BARS: usize = 252;

pub fn run_analysis(scenario: &Scenario, data: &dyn DataPort) -> Result<AnalysisResult, RetrocastError> {
    validate_scenario(scenario)?;

    let started = Instant::now();
    let range = scenario.date_range();
    let raw = data.load(&scenario.underlying, &range)?;
    let bars = normalize_bars(raw, &range);
    tracing::info!(
        source = data.name(),
        ticker = %scenario.underlying,
        bars = bars.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "step 1: data loaded"
    );

    analyze(scenario, bars, Utc::now())
}

/// Run the pipeline on already-normalised bars.
pub fn analyze(
    scenario: &Scenario,
    bars: Vec<OhlcvBar>,
    run_date: DateTime<Utc>,
) -> Result<AnalysisResult, RetrocastError> {
    if bars.len() < MIN_BARS {
        return Err(RetrocastError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    let pipeline = Instant::now();
    let mut dataset = Dataset::new(bars);

    let t0 = Instant::now();
    let mut columns: Vec<String> = Vec::new();
    for spec in scenario.indicator_specs() {
        let name = dataset.ensure(spec)?;
        if !columns.contains(&name) {
            columns.push(name);
        }
    }
    tracing::info!(
        indicators = columns.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "step 2: indicators computed"
    );

    let t0 = Instant::now();
    let mut signals = scan(&dataset, &scenario.conditions);
    tracing::info!(
        signals = signals.len(),
        start_index = scan_start(&scenario.conditions),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "step 3: signals found"
    );

    let t0 = Instant::now();
    evaluate_targets(&dataset, &mut signals, &scenario.targets);
    tracing::info!(
        targets = scenario.targets.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "step 4: targets evaluated"
    );

    let t0 = Instant::now();
    let target_stats = aggregate(&signals, &scenario.targets);
    tracing::info!(elapsed_ms = t0.elapsed().as_millis() as u64, "step 5: statistics computed");

    for stats in &target_stats {
        tracing::info!(
            target_id = %stats.target_id,
            evaluable = stats.total_evaluable,
            hit_rate_pct = stats.hit_rate_pct,
            "target summary"
        );
    }

    let bars = dataset.bars();
    let (data_start, data_end) = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => {
            return Err(RetrocastError::InsufficientData {
                bars: 0,
                minimum: MIN_BARS,
            });
        }
    };

    let result = AnalysisResult {
        scenario_id: scenario.effective_id(),
        scenario_name: scenario.name.clone(),
        underlying: scenario.underlying.clone(),
        run_date: run_date.format(RUN_DATE_FORMAT).to_string(),
        data_start,
        data_end,
        total_bars: bars.len(),
        total_signals: signals.len(),
        target_stats,
        signals,
    };
    tracing::info!(
        total_signals = result.total_signals,
        elapsed_ms = pipeline.elapsed().as_millis() as u64,
        "analysis complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{Comparison, Condition, Operator};
    use crate::domain::indicator::{Indicator, IndicatorSpec};
    use crate::domain::indicator_helpers::test_bars::{from_closes, walk};
    use crate::domain::ohlcv::DateRange;
    use crate::domain::scenario::DataSource;
    use crate::domain::target::{Direction, Target};
    use chrono::TimeZone;

    struct FixedData(Vec<OhlcvBar>);

    impl DataPort for FixedData {
        fn name(&self) -> &str {
            "fixed"
        }

        fn load(&self, _ticker: &str, _range: &DateRange) -> Result<Vec<OhlcvBar>, RetrocastError> {
            Ok(self.0.clone())
        }
    }

    fn scenario(conditions: Vec<Condition>, targets: Vec<Target>) -> Scenario {
        Scenario {
            id: "s1".into(),
            name: "engine test".into(),
            description: String::new(),
            underlying: "TEST".into(),
            data_source: DataSource::Yahoo,
            csv_path: None,
            timeframe: Default::default(),
            date_range_start: None,
            date_range_end: None,
            conditions,
            targets,
        }
    }

    fn price_above(level: f64) -> Condition {
        Condition::new(IndicatorSpec::new(Indicator::Price), Operator::Above, Comparison::Value(level))
    }

    #[test]
    fn rejects_short_history_before_computing() {
        let s = scenario(vec![price_above(0.0)], vec![Target::new("t", 1, 0.0, Direction::Above)]);
        let err = run_analysis(&s, &FixedData(walk(251))).unwrap_err();
        assert!(matches!(err, RetrocastError::InsufficientData { bars: 251, minimum: 252 }));
    }

    #[test]
    fn invalid_scenario_fails_before_loading() {
        let s = scenario(vec![], vec![Target::new("t", 1, 0.0, Direction::Above)]);
        let err = run_analysis(&s, &FixedData(vec![])).unwrap_err();
        assert!(matches!(err, RetrocastError::InvalidScenario { .. }));
    }

    #[test]
    fn run_date_is_formatted_utc() {
        let s = scenario(vec![price_above(1e9)], vec![Target::new("t", 1, 0.0, Direction::Above)]);
        let when = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 6).unwrap();
        let result = analyze(&s, walk(300), when).unwrap();
        assert_eq!(result.run_date, "2024-03-09T14:05:06Z");
        assert_eq!(result.total_signals, 0);
        assert_eq!(result.target_stats.len(), 1);
        assert_eq!(result.target_stats[0].total_evaluable, 0);
    }

    #[test]
    fn hit_examples_through_pipeline() {
        let mut closes = vec![100.0; 300];
        closes[252] = 110.0;
        closes[257] = 112.53;
        closes[262] = 110.0;
        closes[267] = 103.4;
        let s = scenario(vec![price_above(105.0)], vec![Target::new("t5d", 5, 5.0, Direction::Below)]);
        let result = analyze(&s, from_closes(&closes), Utc::now()).unwrap();

        assert_eq!(result.total_signals, 3);
        let first = &result.signals[0].outcomes[0];
        assert_eq!(first.actual_change_pct, Some(2.3));
        assert_eq!(first.hit, Some(false));
        let third = &result.signals[2].outcomes[0];
        assert_eq!(third.actual_change_pct, Some(-6.0));
        assert_eq!(third.hit, Some(true));
        assert_eq!(result.target_stats[0].hit_count, 1);
        assert_eq!(result.target_stats[0].total_evaluable, 3);
    }

    #[test]
    fn data_span_reported() {
        let bars = walk(260);
        let s = scenario(vec![price_above(0.0)], vec![Target::new("t", 300, 0.0, Direction::Above)]);
        let result = analyze(&s, bars.clone(), Utc::now()).unwrap();
        assert_eq!(result.total_bars, 260);
        assert_eq!(result.data_start, bars[0].date);
        assert_eq!(result.data_end, bars[259].date);
        // horizon beyond history: every outcome unevaluable
        assert_eq!(result.total_signals, 259);
        assert!(result.signals.iter().all(|s| s.outcomes[0].hit.is_none()));
    }

    #[test]
    fn zero_close_never_signals_and_result_reloads() {
        let mut closes: Vec<f64> = walk(300).iter().map(|b| b.close).collect();
        closes[100] = 0.0;
        let bars = from_closes(&closes);
        let spike = Condition::new(
            IndicatorSpec::new(Indicator::PriceChange).with_param("period", 1u64),
            Operator::Above,
            Comparison::Value(0.5),
        );
        let s = scenario(vec![spike], vec![Target::new("t", 5, 1.0, Direction::Above)]);
        let result = analyze(&s, bars.clone(), Utc::now()).unwrap();

        assert!(result.total_signals > 0);
        assert!(result.signals.iter().all(|sig| sig.date != bars[101].date));
        for signal in &result.signals {
            assert!(signal.indicator_values.values().all(|v| v.is_finite()));
            for outcome in &signal.outcomes {
                assert!(outcome.actual_change_pct.is_none_or(f64::is_finite));
                assert!(outcome.max_change_pct.is_none_or(f64::is_finite));
            }
        }

        let json = result.to_json_pretty().unwrap();
        assert_eq!(AnalysisResult::from_json(&json).unwrap(), result);
    }
}
