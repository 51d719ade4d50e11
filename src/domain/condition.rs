//! Condition data structures.
//!
//! - `Operator`: how the left indicator relates to the comparison value
//! - `Comparison`: what the left indicator is compared against
//! - `Connector`: how a condition joins the *next* one (AND/OR)
//! - `Condition`: one comparison as configured in a scenario
//!
//! On the wire a condition is a flat JSON object; `RawCondition` mirrors that
//! shape and is validated into the typed form on deserialisation.

use crate::domain::error::RetrocastError;
use crate::domain::indicator::{Indicator, IndicatorSpec, Params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Above,
    Below,
    CrossesAbove,
    CrossesBelow,
}

impl Operator {
    pub fn is_crossing(&self) -> bool {
        matches!(self, Operator::CrossesAbove | Operator::CrossesBelow)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Connector {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Price,
    Value(f64),
    Indicator(IndicatorSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub struct Condition {
    pub id: Option<String>,
    pub indicator: IndicatorSpec,
    pub operator: Operator,
    pub compare: Comparison,
    pub connector: Connector,
}

impl Condition {
    pub fn new(indicator: IndicatorSpec, operator: Operator, compare: Comparison) -> Self {
        Self {
            id: None,
            indicator,
            operator,
            compare,
            connector: Connector::And,
        }
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }

    /// Indicator specs referenced by this condition, left side first.
    pub fn indicator_specs(&self) -> impl Iterator<Item = &IndicatorSpec> {
        let right = match &self.compare {
            Comparison::Indicator(spec) => Some(spec),
            _ => None,
        };
        std::iter::once(&self.indicator).chain(right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum CompareTo {
    Price,
    Value,
    Indicator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    indicator: Indicator,
    #[serde(default)]
    params: Params,
    operator: Operator,
    compare_to: CompareTo,
    #[serde(default)]
    compare_value: Option<f64>,
    #[serde(default)]
    compare_indicator: Option<Indicator>,
    #[serde(default)]
    compare_indicator_params: Option<Params>,
    #[serde(default)]
    connector: Connector,
}

impl TryFrom<RawCondition> for Condition {
    type Error = RetrocastError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let compare = match raw.compare_to {
            CompareTo::Price => Comparison::Price,
            CompareTo::Value => Comparison::Value(raw.compare_value.ok_or_else(|| {
                RetrocastError::scenario("compare_value", "required when compare_to is VALUE")
            })?),
            CompareTo::Indicator => {
                let indicator = raw.compare_indicator.ok_or_else(|| {
                    RetrocastError::scenario(
                        "compare_indicator",
                        "required when compare_to is INDICATOR",
                    )
                })?;
                Comparison::Indicator(IndicatorSpec {
                    indicator,
                    params: raw.compare_indicator_params.unwrap_or_default(),
                })
            }
        };
        Ok(Condition {
            id: raw.id,
            indicator: IndicatorSpec {
                indicator: raw.indicator,
                params: raw.params,
            },
            operator: raw.operator,
            compare,
            connector: raw.connector,
        })
    }
}

impl From<Condition> for RawCondition {
    fn from(c: Condition) -> Self {
        let (compare_to, compare_value, compare_indicator, compare_indicator_params) =
            match c.compare {
                Comparison::Price => (CompareTo::Price, None, None, None),
                Comparison::Value(v) => (CompareTo::Value, Some(v), None, None),
                Comparison::Indicator(spec) => {
                    (CompareTo::Indicator, None, Some(spec.indicator), Some(spec.params))
                }
            };
        RawCondition {
            id: c.id,
            indicator: c.indicator.indicator,
            params: c.indicator.params,
            operator: c.operator,
            compare_to,
            compare_value,
            compare_indicator,
            compare_indicator_params,
            connector: c.connector,
        }
    }
}
