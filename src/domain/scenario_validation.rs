//! Scenario validation.
//!
//! Validates every scenario field before any data is loaded, so a bad
//! scenario is rejected as a whole and never partially computed.
//!
//! A BELOW target with a positive threshold is accepted; the threshold is
//! read as a decline of that size. Such targets are logged at `warn` since
//! they usually signal a sign mix-up upstream.

use crate::domain::error::RetrocastError;
use crate::domain::scenario::{DataSource, Scenario};
use crate::domain::condition::Comparison;
use crate::domain::target::Direction;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_UNDERLYING_LEN: usize = 20;
pub const MAX_DAYS_FORWARD: usize = 504;

pub fn validate_scenario(scenario: &Scenario) -> Result<(), RetrocastError> {
    validate_name(scenario)?;
    validate_underlying(scenario)?;
    validate_source(scenario)?;
    validate_dates(scenario)?;
    validate_conditions(scenario)?;
    validate_targets(scenario)?;
    Ok(())
}

fn validate_name(scenario: &Scenario) -> Result<(), RetrocastError> {
    let len = scenario.name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(RetrocastError::scenario(
            "name",
            format!("must be 1..={MAX_NAME_LEN} characters, got {len}"),
        ));
    }
    Ok(())
}

fn validate_underlying(scenario: &Scenario) -> Result<(), RetrocastError> {
    let len = scenario.underlying.trim().chars().count();
    if len == 0 || len > MAX_UNDERLYING_LEN {
        return Err(RetrocastError::scenario(
            "underlying",
            format!("must be 1..={MAX_UNDERLYING_LEN} characters, got {len}"),
        ));
    }
    Ok(())
}

fn validate_source(scenario: &Scenario) -> Result<(), RetrocastError> {
    if scenario.data_source == DataSource::Csv
        && scenario.csv_path.as_deref().is_none_or(|p| p.trim().is_empty())
    {
        return Err(RetrocastError::scenario(
            "csv_path",
            "required when data_source is CSV",
        ));
    }
    Ok(())
}

fn validate_dates(scenario: &Scenario) -> Result<(), RetrocastError> {
    if let (Some(start), Some(end)) = (scenario.date_range_start, scenario.date_range_end) {
        if start > end {
            return Err(RetrocastError::scenario(
                "date_range_start",
                format!("{start} is after date_range_end {end}"),
            ));
        }
    }
    Ok(())
}

fn validate_conditions(scenario: &Scenario) -> Result<(), RetrocastError> {
    if scenario.conditions.is_empty() {
        return Err(RetrocastError::scenario("conditions", "at least one condition is required"));
    }
    for (i, condition) in scenario.conditions.iter().enumerate() {
        if let Comparison::Value(v) = condition.compare {
            if !v.is_finite() {
                return Err(RetrocastError::scenario(
                    &format!("conditions[{i}].compare_value"),
                    "must be a finite number",
                ));
            }
        }
        for spec in condition.indicator_specs() {
            spec.resolve()?;
        }
    }
    Ok(())
}

fn validate_targets(scenario: &Scenario) -> Result<(), RetrocastError> {
    if scenario.targets.is_empty() {
        return Err(RetrocastError::scenario("targets", "at least one target is required"));
    }
    for (i, target) in scenario.targets.iter().enumerate() {
        if !(1..=MAX_DAYS_FORWARD).contains(&target.days_forward) {
            return Err(RetrocastError::scenario(
                &format!("targets[{i}].days_forward"),
                format!("must be between 1 and {MAX_DAYS_FORWARD}, got {}", target.days_forward),
            ));
        }
        if !target.threshold_pct.is_finite() {
            return Err(RetrocastError::scenario(
                &format!("targets[{i}].threshold_pct"),
                "must be a finite number",
            ));
        }
        if target.direction == Direction::Below && target.threshold_pct > 0.0 {
            tracing::warn!(
                target_id = %target.id,
                threshold_pct = target.threshold_pct,
                "BELOW target has a positive threshold; treating it as a decline of that size"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{Condition, Operator};
    use crate::domain::indicator::{Indicator, IndicatorSpec};
    use crate::domain::target::Target;
    use chrono::NaiveDate;

    fn valid() -> Scenario {
        Scenario {
            id: String::new(),
            name: "RSI dip".into(),
            description: String::new(),
            underlying: "SPY".into(),
            data_source: DataSource::Csv,
            csv_path: Some("spy.csv".into()),
            timeframe: Default::default(),
            date_range_start: None,
            date_range_end: None,
            conditions: vec![Condition::new(
                IndicatorSpec::new(Indicator::Rsi).with_param("period", 14u64),
                Operator::Below,
                Comparison::Value(30.0),
            )],
            targets: vec![Target::new("t", 10, 2.0, Direction::Above)],
        }
    }

    fn field_of(err: RetrocastError) -> String {
        match err {
            RetrocastError::InvalidScenario { field, .. } => field,
            other => panic!("expected InvalidScenario, got {other:?}"),
        }
    }

    #[test]
    fn valid_scenario_passes() {
        assert!(validate_scenario(&valid()).is_ok());
    }

    #[test]
    fn name_length_bounds() {
        let mut s = valid();
        s.name = String::new();
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "name");
        s.name = "x".repeat(201);
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "name");
        s.name = "x".repeat(200);
        assert!(validate_scenario(&s).is_ok());
    }

    #[test]
    fn underlying_length_bounds() {
        let mut s = valid();
        s.underlying = "ABCDEFGHIJKLMNOPQRSTU".into();
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "underlying");
    }

    #[test]
    fn csv_requires_path() {
        let mut s = valid();
        s.csv_path = None;
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "csv_path");
        s.data_source = DataSource::Yahoo;
        assert!(validate_scenario(&s).is_ok());
    }

    #[test]
    fn reversed_dates_rejected() {
        let mut s = valid();
        s.date_range_start = NaiveDate::from_ymd_opt(2024, 1, 1);
        s.date_range_end = NaiveDate::from_ymd_opt(2023, 1, 1);
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "date_range_start");
    }

    #[test]
    fn empty_lists_rejected() {
        let mut s = valid();
        s.conditions.clear();
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "conditions");
        let mut s = valid();
        s.targets.clear();
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "targets");
    }

    #[test]
    fn days_forward_bounds() {
        let mut s = valid();
        s.targets[0].days_forward = 0;
        assert_eq!(field_of(validate_scenario(&s).unwrap_err()), "targets[0].days_forward");
        s.targets[0].days_forward = 505;
        assert!(validate_scenario(&s).is_err());
        s.targets[0].days_forward = 504;
        assert!(validate_scenario(&s).is_ok());
    }

    #[test]
    fn unresolvable_indicator_params_rejected() {
        let mut s = valid();
        s.conditions[0].compare = Comparison::Indicator(IndicatorSpec::new(Indicator::Sma));
        let err = validate_scenario(&s).unwrap_err();
        assert!(matches!(err, RetrocastError::InvalidParameters { .. }));
    }

    #[test]
    fn below_with_positive_threshold_is_accepted() {
        let mut s = valid();
        s.targets[0] = Target::new("t", 5, 5.0, Direction::Below);
        assert!(validate_scenario(&s).is_ok());
    }
}
