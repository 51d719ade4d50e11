#![allow(dead_code)]

use chrono::NaiveDate;
use retrocast::domain::error::RetrocastError;
pub use retrocast::domain::ohlcv::{DateRange, OhlcvBar};
use retrocast::domain::scenario::Scenario;
use retrocast::ports::data_port::DataPort;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn load(&self, ticker: &str, range: &DateRange) -> Result<Vec<OhlcvBar>, RetrocastError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(RetrocastError::SourceUnavailable {
                source_name: "mock".into(),
                reason: reason.clone(),
            });
        }
        let bars: Vec<OhlcvBar> = self
            .data
            .get(ticker)
            .map(|bars| bars.iter().filter(|b| range.contains(b.date)).cloned().collect())
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(RetrocastError::NoData {
                ticker: ticker.to_string(),
                source_name: "mock".into(),
            });
        }
        Ok(bars)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        date,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per calendar day starting at `start`.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start + chrono::Duration::days(i as i64), c))
        .collect()
}

/// Alternating +1%/-0.5% daily moves from 100.
pub fn zigzag(count: usize) -> Vec<f64> {
    let mut closes = Vec::with_capacity(count);
    let mut price = 100.0;
    for i in 0..count {
        closes.push(price);
        price *= if i % 2 == 0 { 1.01 } else { 0.995 };
    }
    closes
}

pub fn scenario_json(data_source: &str, extra: &str, conditions: &str, targets: &str) -> String {
    format!(
        r#"{{"id":"it","name":"integration","underlying":"TEST","data_source":"{data_source}"{extra},
            "conditions":{conditions},"targets":{targets}}}"#
    )
}

pub fn scenario(conditions: &str, targets: &str) -> Scenario {
    Scenario::from_json(&scenario_json("YAHOO", "", conditions, targets)).unwrap()
}

pub fn to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
