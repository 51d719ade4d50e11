//! Condition evaluation.
//!
//! # Evaluation Semantics
//!
//! - Conditions are grouped into AND-groups; a condition whose connector is
//!   OR closes its group, and the last condition always closes the final one
//! - The expression is true when any group has all members true
//! - An empty condition list is false
//! - `CROSSES_ABOVE`/`CROSSES_BELOW`: Require `index >= 1`, return `false` at index 0
//! - A missing column or an undefined value (NaN or infinite) on either
//!   side makes the condition false; nothing here returns an error

use crate::domain::condition::{Comparison, Condition, Connector, Operator};
use crate::domain::dataset::Dataset;
use crate::domain::indicator::IndicatorSpec;

pub fn evaluate(dataset: &Dataset, index: usize, conditions: &[Condition]) -> bool {
    build_groups(conditions)
        .iter()
        .any(|group| group.iter().all(|c| evaluate_single(dataset, index, c)))
}

/// Split conditions into AND-groups at OR connectors.
pub fn build_groups(conditions: &[Condition]) -> Vec<&[Condition]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (i, condition) in conditions.iter().enumerate() {
        if condition.connector == Connector::Or || i == conditions.len() - 1 {
            groups.push(&conditions[start..=i]);
            start = i + 1;
        }
    }
    groups
}

#[derive(Clone, Copy)]
enum Operand<'a> {
    Series(&'a [f64]),
    Constant(f64),
}

impl Operand<'_> {
    fn at(&self, index: usize) -> Option<f64> {
        let value = match self {
            Operand::Series(values) => *values.get(index)?,
            Operand::Constant(v) => *v,
        };
        value.is_finite().then_some(value)
    }
}

fn lookup<'a>(dataset: &'a Dataset, spec: &IndicatorSpec) -> Option<&'a [f64]> {
    let name = match spec.column_name() {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!(indicator = %spec.indicator, error = %err, "cannot name indicator column");
            return None;
        }
    };
    let column = dataset.column(&name);
    if column.is_none() {
        tracing::warn!(column = %name, "indicator column not computed; condition is false");
    }
    column
}

pub fn evaluate_single(dataset: &Dataset, index: usize, condition: &Condition) -> bool {
    let Some(left) = lookup(dataset, &condition.indicator) else {
        return false;
    };
    let left = Operand::Series(left);
    let right = match &condition.compare {
        Comparison::Price => Operand::Series(dataset.closes()),
        Comparison::Value(v) => Operand::Constant(*v),
        Comparison::Indicator(spec) => match lookup(dataset, spec) {
            Some(values) => Operand::Series(values),
            None => return false,
        },
    };

    let (Some(curr_left), Some(curr_right)) = (left.at(index), right.at(index)) else {
        return false;
    };

    match condition.operator {
        Operator::Above => curr_left > curr_right,
        Operator::Below => curr_left < curr_right,
        Operator::CrossesAbove | Operator::CrossesBelow => {
            if index == 0 {
                return false;
            }
            let (Some(prev_left), Some(prev_right)) = (left.at(index - 1), right.at(index - 1))
            else {
                return false;
            };
            if condition.operator == Operator::CrossesAbove {
                prev_left <= prev_right && curr_left > curr_right
            } else {
                prev_left >= prev_right && curr_left < curr_right
            }
        }
    }
}
