//! Scenario configuration: the underlying to study, where its prices come
//! from, the signal conditions and the forward targets.

use crate::domain::condition::Condition;
use crate::domain::error::RetrocastError;
use crate::domain::indicator::IndicatorSpec;
use crate::domain::ohlcv::DateRange;
use crate::domain::target::Target;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    Csv,
    #[default]
    Yahoo,
    Norgate,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Csv => "CSV",
            DataSource::Yahoo => "YAHOO",
            DataSource::Norgate => "NORGATE",
        }
    }
}

/// Only daily bars are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "DAILY", alias = "1d")]
    Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub underlying: String,
    #[serde(default)]
    pub data_source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<String>,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub date_range_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_range_end: Option<NaiveDate>,
    pub conditions: Vec<Condition>,
    pub targets: Vec<Target>,
}

impl Scenario {
    /// Parse a scenario document. Targets without an id are numbered
    /// `target-1`, `target-2`, ... in order. Unknown operators, sources
    /// or malformed fields are reported as an invalid scenario.
    pub fn from_json(json: &str) -> Result<Self, RetrocastError> {
        let mut scenario: Scenario = serde_json::from_str(json)
            .map_err(|e| RetrocastError::scenario("document", e.to_string()))?;
        for (i, target) in scenario.targets.iter_mut().enumerate() {
            if target.id.trim().is_empty() {
                target.id = format!("target-{}", i + 1);
            }
        }
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, RetrocastError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.date_range_start, self.date_range_end)
    }

    /// Every indicator referenced on either side of any condition, in order.
    pub fn indicator_specs(&self) -> impl Iterator<Item = &IndicatorSpec> {
        self.conditions.iter().flat_map(Condition::indicator_specs)
    }

    /// `id` when set, otherwise a slug derived from `name`.
    pub fn effective_id(&self) -> String {
        if !self.id.trim().is_empty() {
            return self.id.trim().to_string();
        }
        let slug: String = self
            .name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        slug.split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}
