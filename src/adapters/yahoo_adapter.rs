//! Yahoo Finance chart API adapter.
//!
//! Fetches daily bars from the v8 chart endpoint with a blocking client.
//! Transport failures and non-success statuses are retried with exponential
//! backoff; a well-formed response with no bars is `NoData`.

use crate::domain::error::RetrocastError;
use crate::domain::ohlcv::{DateRange, OhlcvBar};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const SOURCE: &str = "YAHOO";
const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const DEFAULT_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_MAX_RETRIES: i64 = 3;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Quotes,
}

#[derive(Debug, Deserialize)]
struct Quotes {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

fn unavailable(reason: impl std::fmt::Display) -> RetrocastError {
    RetrocastError::SourceUnavailable {
        source_name: SOURCE.to_string(),
        reason: reason.to_string(),
    }
}

impl YahooAdapter {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, RetrocastError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(unavailable)?;
        Ok(Self {
            client,
            max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Reads `[yahoo] timeout_secs` and `max_retries`.
    pub fn from_config(config: Option<&dyn ConfigPort>) -> Result<Self, RetrocastError> {
        let (timeout, retries) = match config {
            Some(c) => (
                c.get_int("yahoo", "timeout_secs", DEFAULT_TIMEOUT_SECS),
                c.get_int("yahoo", "max_retries", DEFAULT_MAX_RETRIES),
            ),
            None => (DEFAULT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES),
        };
        if timeout < 1 {
            return Err(RetrocastError::ConfigInvalid {
                section: "yahoo".into(),
                key: "timeout_secs".into(),
                reason: format!("must be positive, got {timeout}"),
            });
        }
        if !(0..=10).contains(&retries) {
            return Err(RetrocastError::ConfigInvalid {
                section: "yahoo".into(),
                key: "max_retries".into(),
                reason: format!("must be between 0 and 10, got {retries}"),
            });
        }
        Self::new(Duration::from_secs(timeout as u64), retries as u32)
    }

    fn chart_url(ticker: &str, range: &DateRange) -> String {
        let period1 = range
            .start
            .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
            .unwrap_or(0);
        let end = range.end.unwrap_or_else(|| Utc::now().date_naive());
        let period2 = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "{BASE_URL}/{ticker}?period1={period1}&period2={period2}&interval=1d&includeAdjustedClose=true"
        )
    }

    fn fetch(&self, ticker: &str, range: &DateRange) -> Result<ChartResponse, RetrocastError> {
        let url = Self::chart_url(ticker, range);
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(ticker, attempt, delay_ms = delay.as_millis() as u64, error = %last_error, "retrying Yahoo request");
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(RetrocastError::NoData {
                            ticker: ticker.to_string(),
                            source_name: SOURCE.to_string(),
                        });
                    }
                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(unavailable(format!("HTTP {status}")));
                    }
                    if !status.is_success() {
                        last_error = format!("HTTP {status}");
                        continue;
                    }
                    return resp.json::<ChartResponse>().map_err(|e| RetrocastError::DataFormat {
                        reason: format!("unreadable Yahoo response for {ticker}: {e}"),
                    });
                }
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    last_error = e.to_string();
                }
                Err(e) => return Err(unavailable(e)),
            }
        }
        Err(unavailable(format!(
            "gave up after {} attempts: {last_error}",
            self.max_retries + 1
        )))
    }
}

fn parse_chart(ticker: &str, resp: ChartResponse) -> Result<Vec<OhlcvBar>, RetrocastError> {
    let no_data = || RetrocastError::NoData {
        ticker: ticker.to_string(),
        source_name: SOURCE.to_string(),
    };

    let Some(results) = resp.chart.result else {
        return match resp.chart.error {
            Some(err) if err.code == "Not Found" => Err(no_data()),
            Some(err) => Err(RetrocastError::DataFormat {
                reason: format!("Yahoo error {}: {}", err.code, err.description),
            }),
            None => Err(no_data()),
        };
    };
    let Some(data) = results.into_iter().next() else {
        return Err(no_data());
    };
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();
    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = DateTime::<Utc>::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| RetrocastError::DataFormat {
                reason: format!("invalid timestamp {ts}"),
            })?;
        // Holidays come back as all-null rows.
        let Some(close) = at(&quote.close, i) else {
            continue;
        };
        bars.push(OhlcvBar {
            date,
            open: at(&quote.open, i).unwrap_or(f64::NAN),
            high: at(&quote.high, i).unwrap_or(f64::NAN),
            low: at(&quote.low, i).unwrap_or(f64::NAN),
            close,
            volume: at(&quote.volume, i).unwrap_or(0.0),
        });
    }

    if bars.is_empty() {
        return Err(no_data());
    }
    Ok(bars)
}

impl DataPort for YahooAdapter {
    fn name(&self) -> &str {
        SOURCE
    }

    fn load(&self, ticker: &str, range: &DateRange) -> Result<Vec<OhlcvBar>, RetrocastError> {
        let resp = self.fetch(ticker, range)?;
        let bars = parse_chart(ticker, resp)?;
        tracing::debug!(ticker, bars = bars.len(), "fetched Yahoo bars");
        Ok(bars)
    }
}
