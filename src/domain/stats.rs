//! Per-target outcome statistics.

use crate::domain::result::{Signal, TargetStats, round_dp};
use crate::domain::target::Target;

impl TargetStats {
    /// Stats for a target with no evaluable outcomes: zero counts and values,
    /// empty distribution.
    pub fn empty(target: &Target) -> Self {
        Self {
            target_id: target.id.clone(),
            days_forward: target.days_forward,
            threshold_pct: target.threshold_pct,
            direction: target.direction,
            total_evaluable: 0,
            hit_count: 0,
            miss_count: 0,
            hit_rate_pct: 0.0,
            avg_change_pct: 0.0,
            median_change_pct: 0.0,
            max_change_pct: 0.0,
            min_change_pct: 0.0,
            std_dev: 0.0,
            percentile_5: 0.0,
            percentile_25: 0.0,
            percentile_75: 0.0,
            percentile_95: 0.0,
            distribution: Vec::new(),
        }
    }

    pub fn compute(target: &Target, changes: &[f64], hit_count: usize) -> Self {
        let n = changes.len();
        if n == 0 {
            return Self::empty(target);
        }

        let mut sorted = changes.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = changes.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let var = changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Self {
            target_id: target.id.clone(),
            days_forward: target.days_forward,
            threshold_pct: target.threshold_pct,
            direction: target.direction,
            total_evaluable: n,
            hit_count,
            miss_count: n - hit_count,
            hit_rate_pct: round_dp(hit_count as f64 / n as f64 * 100.0, 2),
            avg_change_pct: round_dp(mean, 4),
            median_change_pct: round_dp(percentile_sorted(&sorted, 50.0), 4),
            max_change_pct: round_dp(sorted[n - 1], 4),
            min_change_pct: round_dp(sorted[0], 4),
            std_dev: round_dp(std_dev, 4),
            percentile_5: round_dp(percentile_sorted(&sorted, 5.0), 4),
            percentile_25: round_dp(percentile_sorted(&sorted, 25.0), 4),
            percentile_75: round_dp(percentile_sorted(&sorted, 75.0), 4),
            percentile_95: round_dp(percentile_sorted(&sorted, 95.0), 4),
            distribution: changes.iter().map(|c| round_dp(*c, 4)).collect(),
        }
    }
}

/// Aggregate evaluable outcomes per target. Outcomes are matched to targets
/// by position, so the output order follows `targets`.
pub fn aggregate(signals: &[Signal], targets: &[Target]) -> Vec<TargetStats> {
    targets
        .iter()
        .enumerate()
        .map(|(i, target)| {
            let mut changes = Vec::new();
            let mut hits = 0usize;
            let evaluable = signals
                .iter()
                .filter_map(|s| s.outcomes.get(i))
                .filter(|o| o.is_evaluable());
            for outcome in evaluable {
                if let (Some(hit), Some(change)) = (outcome.hit, outcome.actual_change_pct) {
                    changes.push(change);
                    hits += usize::from(hit);
                }
            }
            TargetStats::compute(target, &changes, hits)
        })
        .collect()
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::SignalOutcome;
    use crate::domain::target::Direction;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn target(id: &str) -> Target {
        Target::new(id, 5, 0.0, Direction::Above)
    }

    fn outcome(t: &Target, change: Option<f64>) -> SignalOutcome {
        SignalOutcome {
            target_id: t.id.clone(),
            days_forward: t.days_forward,
            threshold_pct: t.threshold_pct,
            direction: t.direction,
            future_date: change.map(|_| NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            future_price: change.map(|_| 100.0),
            actual_change_pct: change,
            max_change_pct: change,
            hit: change.map(|c| t.is_hit(c)),
        }
    }

    fn signal(outcomes: Vec<SignalOutcome>) -> Signal {
        Signal {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            price: 100.0,
            indicator_values: BTreeMap::new(),
            outcomes,
        }
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile_sorted(&sorted, 50.0), 2.5);
        assert_relative_eq!(percentile_sorted(&sorted, 25.0), 1.75);
        assert_relative_eq!(percentile_sorted(&sorted, 0.0), 1.0);
        assert_relative_eq!(percentile_sorted(&sorted, 100.0), 4.0);
        assert_eq!(percentile_sorted(&[], 50.0), 0.0);
    }

    #[test]
    fn known_distribution() {
        let t = target("t");
        let stats = TargetStats::compute(&t, &[2.0, -1.0, 4.0, 3.0], 3);
        assert_eq!(stats.total_evaluable, 4);
        assert_eq!(stats.hit_count, 3);
        assert_eq!(stats.miss_count, 1);
        assert_relative_eq!(stats.hit_rate_pct, 75.0);
        assert_relative_eq!(stats.avg_change_pct, 2.0);
        assert_relative_eq!(stats.median_change_pct, 2.5);
        assert_relative_eq!(stats.max_change_pct, 4.0);
        assert_relative_eq!(stats.min_change_pct, -1.0);
        // sample variance: (0 + 9 + 4 + 1) / 3
        assert_relative_eq!(stats.std_dev, round_dp((14.0f64 / 3.0).sqrt(), 4));
        assert_relative_eq!(stats.percentile_5, round_dp(-1.0 + 0.15 * 3.0, 4));
        assert_eq!(stats.distribution, vec![2.0, -1.0, 4.0, 3.0]);
    }

    #[test]
    fn single_outcome_has_zero_std() {
        let stats = TargetStats::compute(&target("t"), &[1.5], 1);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.percentile_95, 1.5);
    }

    #[test]
    fn hit_rate_rounded_to_two_places() {
        let stats = TargetStats::compute(&target("t"), &[1.0, -1.0, -2.0], 1);
        assert_eq!(stats.hit_rate_pct, 33.33);
    }

    #[test]
    fn empty_evaluable_set_is_zeroed() {
        let t = target("t");
        let signals = vec![signal(vec![outcome(&t, None)])];
        let stats = aggregate(&signals, &[t]);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_evaluable, 0);
        assert_eq!(stats[0].hit_rate_pct, 0.0);
        assert!(stats[0].distribution.is_empty());
    }

    #[test]
    fn aggregate_skips_unevaluable_and_keeps_target_order() {
        let a = target("a");
        let b = Target::new("b", 10, -3.0, Direction::Below);
        let signals = vec![
            signal(vec![outcome(&a, Some(1.0)), outcome(&b, Some(-4.0))]),
            signal(vec![outcome(&a, Some(-1.0)), outcome(&b, None)]),
        ];
        let stats = aggregate(&signals, &[a, b]);
        assert_eq!(stats[0].target_id, "a");
        assert_eq!(stats[0].total_evaluable, 2);
        assert_eq!(stats[0].hit_count, 1);
        assert_eq!(stats[1].target_id, "b");
        assert_eq!(stats[1].total_evaluable, 1);
        assert_eq!(stats[1].hit_count, 1);
    }

    #[test]
    fn no_signals_gives_one_record_per_target() {
        let stats = aggregate(&[], &[target("a"), target("b")]);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.total_evaluable == 0));
    }
}
