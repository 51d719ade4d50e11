//! Forward targets and their evaluation at each signal.
//!
//! A target asks: `days_forward` bars after the signal, did the close move
//! by at least `threshold_pct` in `direction`? ABOVE compares the signed
//! change against the signed threshold. BELOW treats the threshold as a
//! magnitude of decline, so `5.0` and `-5.0` both mean "fell 5% or more".
//!
//! The plain formula `change <= threshold` would score a +2.3% rise as a
//! hit for BELOW 5.0. The worked hit examples require that case to be a
//! miss, so BELOW compares against `-|threshold|` instead.
//!
//! An outcome is unevaluable when the horizon runs past the data or when
//! the move cannot be expressed as a finite percentage (a zero signal price).

use crate::domain::dataset::Dataset;
use crate::domain::result::{Signal, SignalOutcome, round_dp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "ABOVE",
            Direction::Below => "BELOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub id: String,
    pub days_forward: usize,
    pub threshold_pct: f64,
    pub direction: Direction,
}

impl Target {
    pub fn new(id: impl Into<String>, days_forward: usize, threshold_pct: f64, direction: Direction) -> Self {
        Self {
            id: id.into(),
            days_forward,
            threshold_pct,
            direction,
        }
    }

    /// `change_pct` is the unrounded percentage move.
    pub fn is_hit(&self, change_pct: f64) -> bool {
        match self.direction {
            Direction::Above => change_pct >= self.threshold_pct,
            Direction::Below => change_pct <= -self.threshold_pct.abs(),
        }
    }

    fn unevaluable(&self) -> SignalOutcome {
        SignalOutcome {
            target_id: self.id.clone(),
            days_forward: self.days_forward,
            threshold_pct: self.threshold_pct,
            direction: self.direction,
            future_date: None,
            future_price: None,
            actual_change_pct: None,
            max_change_pct: None,
            hit: None,
        }
    }
}

fn pct_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

/// Judge `target` for a signal at bar `index` whose recorded price is
/// `signal_price`.
pub fn evaluate_target(
    dataset: &Dataset,
    index: usize,
    signal_price: f64,
    target: &Target,
) -> SignalOutcome {
    let future_index = index + target.days_forward;
    let bars = dataset.bars();
    if future_index >= bars.len() {
        return target.unevaluable();
    }

    if signal_price == 0.0 || !signal_price.is_finite() {
        return target.unevaluable();
    }

    let future = &bars[future_index];
    let change_pct = pct_change(signal_price, future.close);

    let window = bars[index + 1..=future_index]
        .iter()
        .map(|b| pct_change(signal_price, b.close));
    let max_change = match target.direction {
        Direction::Above => window.fold(f64::NEG_INFINITY, f64::max),
        Direction::Below => window.fold(f64::INFINITY, f64::min),
    };
    if !change_pct.is_finite() || !max_change.is_finite() {
        return target.unevaluable();
    }

    SignalOutcome {
        target_id: target.id.clone(),
        days_forward: target.days_forward,
        threshold_pct: target.threshold_pct,
        direction: target.direction,
        future_date: Some(future.date),
        future_price: Some(round_dp(future.close, 4)),
        actual_change_pct: Some(round_dp(change_pct, 4)),
        max_change_pct: Some(round_dp(max_change, 4)),
        hit: Some(target.is_hit(change_pct)),
    }
}

/// Attach one outcome per target, in target order, to every signal.
pub fn evaluate_targets(dataset: &Dataset, signals: &mut [Signal], targets: &[Target]) {
    for signal in signals.iter_mut() {
        signal.outcomes = match dataset.bar_index(signal.date) {
            Some(index) => targets
                .iter()
                .map(|t| evaluate_target(dataset, index, signal.price, t))
                .collect(),
            None => {
                tracing::warn!(date = %signal.date, "signal date not in dataset");
                targets.iter().map(Target::unevaluable).collect()
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::test_bars::from_closes;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn signal_at(ds: &Dataset, index: usize) -> Signal {
        Signal {
            date: ds.bars()[index].date,
            price: ds.bars()[index].close,
            indicator_values: BTreeMap::new(),
            outcomes: vec![],
        }
    }

    #[test]
    fn below_target_hit_on_drop() {
        let ds = Dataset::new(from_closes(&[110.0, 109.0, 108.0, 107.0, 106.0, 103.4]));
        let target = Target::new("t", 5, 5.0, Direction::Below);
        let outcome = evaluate_target(&ds, 0, 110.0, &target);
        assert_relative_eq!(outcome.actual_change_pct.unwrap(), -6.0);
        assert_eq!(outcome.hit, Some(true));
        assert_eq!(outcome.future_price, Some(103.4));
        assert_eq!(outcome.future_date, Some(ds.bars()[5].date));
    }

    #[test]
    fn below_target_missed_on_rise() {
        let ds = Dataset::new(from_closes(&[110.0, 111.0, 112.0, 113.0, 114.0, 112.53]));
        let target = Target::new("t", 5, 5.0, Direction::Below);
        let outcome = evaluate_target(&ds, 0, 110.0, &target);
        assert_relative_eq!(outcome.actual_change_pct.unwrap(), 2.3);
        assert_eq!(outcome.hit, Some(false));
    }

    #[test]
    fn below_threshold_sign_is_ignored() {
        let pos = Target::new("t", 1, 5.0, Direction::Below);
        let neg = Target::new("t", 1, -5.0, Direction::Below);
        for change in [-7.5, -5.0, -4.99, 0.0, 2.3] {
            assert_eq!(pos.is_hit(change), neg.is_hit(change), "{change}");
        }
        assert!(neg.is_hit(-5.0));
        assert!(!neg.is_hit(-4.99));
    }

    #[test]
    fn above_threshold_is_signed() {
        let t = Target::new("t", 1, -2.0, Direction::Above);
        assert!(t.is_hit(-1.5));
        assert!(!t.is_hit(-2.5));
    }

    #[test]
    fn above_target_boundary_is_inclusive() {
        let ds = Dataset::new(from_closes(&[100.0, 105.0]));
        let target = Target::new("t", 1, 5.0, Direction::Above);
        assert_eq!(evaluate_target(&ds, 0, 100.0, &target).hit, Some(true));
    }

    #[test]
    fn max_change_tracks_direction() {
        let ds = Dataset::new(from_closes(&[100.0, 108.0, 95.0, 102.0]));
        let up = evaluate_target(&ds, 0, 100.0, &Target::new("u", 3, 0.0, Direction::Above));
        assert_relative_eq!(up.max_change_pct.unwrap(), 8.0);
        let down = evaluate_target(&ds, 0, 100.0, &Target::new("d", 3, 0.0, Direction::Below));
        assert_relative_eq!(down.max_change_pct.unwrap(), -5.0);
    }

    #[test]
    fn end_of_history_is_all_null() {
        let ds = Dataset::new(from_closes(&[100.0, 101.0, 102.0]));
        let outcome = evaluate_target(&ds, 1, 101.0, &Target::new("t", 2, 1.0, Direction::Above));
        assert_eq!(outcome.hit, None);
        assert_eq!(outcome.future_date, None);
        assert_eq!(outcome.future_price, None);
        assert_eq!(outcome.actual_change_pct, None);
        assert_eq!(outcome.max_change_pct, None);
        // last index is still reachable
        let edge = evaluate_target(&ds, 1, 101.0, &Target::new("t", 1, 1.0, Direction::Above));
        assert!(edge.hit.is_some());
    }

    #[test]
    fn zero_signal_price_is_unevaluable() {
        let ds = Dataset::new(from_closes(&[0.0, 1.0, 2.0]));
        for direction in [Direction::Above, Direction::Below] {
            let outcome = evaluate_target(&ds, 0, 0.0, &Target::new("t", 2, 1.0, direction));
            assert_eq!(outcome.hit, None);
            assert_eq!(outcome.future_date, None);
            assert_eq!(outcome.actual_change_pct, None);
            assert_eq!(outcome.max_change_pct, None);
        }
    }

    #[test]
    fn zero_future_close_is_a_full_loss() {
        let ds = Dataset::new(from_closes(&[50.0, 0.0]));
        let outcome = evaluate_target(&ds, 0, 50.0, &Target::new("t", 1, 5.0, Direction::Below));
        assert_eq!(outcome.actual_change_pct, Some(-100.0));
        assert_eq!(outcome.hit, Some(true));
    }

    #[test]
    fn one_outcome_per_target_in_order() {
        let ds = Dataset::new(from_closes(&[100.0, 101.0, 102.0, 103.0]));
        let targets = vec![
            Target::new("a", 1, 0.0, Direction::Above),
            Target::new("b", 3, 0.0, Direction::Below),
            Target::new("c", 10, 0.0, Direction::Above),
        ];
        let mut signals = vec![signal_at(&ds, 0), signal_at(&ds, 2)];
        evaluate_targets(&ds, &mut signals, &targets);
        for s in &signals {
            let ids: Vec<&str> = s.outcomes.iter().map(|o| o.target_id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b", "c"]);
        }
        assert!(signals[0].outcomes[1].hit.is_some());
        assert!(signals[1].outcomes[1].hit.is_none());
        assert!(signals[0].outcomes[2].hit.is_none());
    }
}
