//! CSV file data adapter.
//!
//! Reads one OHLCV file with a header row. Column names are matched
//! case-insensitively; the date column is the first of `date`, `datetime`
//! or `timestamp`, falling back to the first column.

use crate::domain::error::RetrocastError;
use crate::domain::ohlcv::{DateRange, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

const DATE_CANDIDATES: [&str; 3] = ["date", "datetime", "timestamp"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Resolve `csv_path` against `base_dir` unless it is already absolute.
    pub fn resolve(base_dir: Option<&Path>, csv_path: &str) -> Self {
        let path = PathBuf::from(csv_path);
        match base_dir {
            Some(base) if path.is_relative() => Self::new(base.join(path)),
            _ => Self::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, RetrocastError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        let date = DATE_CANDIDATES
            .iter()
            .find_map(|c| find(*c))
            .unwrap_or(0);

        let missing: Vec<&str> = ["open", "high", "low", "close", "volume"]
            .into_iter()
            .filter(|c| find(*c).is_none())
            .collect();
        if names.is_empty() || !missing.is_empty() {
            return Err(RetrocastError::DataFormat {
                reason: format!("missing required columns: {}", missing.join(", ")),
            });
        }

        let get = |wanted: &str| find(wanted).unwrap_or_default();
        Ok(Self {
            date,
            open: get("open"),
            high: get("high"),
            low: get("low"),
            close: get("close"),
            volume: get("volume"),
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next().unwrap_or_default();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

fn parse_number(record: &csv::StringRecord, index: usize) -> f64 {
    record
        .get(index)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

pub fn read_bars(path: &Path) -> Result<Vec<OhlcvBar>, RetrocastError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| match e.kind() {
            csv::ErrorKind::Io(io) => RetrocastError::Io(std::io::Error::new(
                io.kind(),
                format!("failed to read {}: {}", path.display(), io),
            )),
            _ => RetrocastError::DataFormat {
                reason: format!("{}: {}", path.display(), e),
            },
        })?;

    let headers = rdr.headers().map_err(|e| RetrocastError::DataFormat {
        reason: format!("{}: unreadable header: {}", path.display(), e),
    })?;
    let cols = Columns::locate(headers)?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| RetrocastError::DataFormat {
            reason: format!("CSV parse error: {}", e),
        })?;
        let raw_date = record.get(cols.date).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| RetrocastError::DataFormat {
            reason: format!("row {}: invalid date '{}'", row + 2, raw_date),
        })?;

        bars.push(OhlcvBar {
            date,
            open: parse_number(&record, cols.open),
            high: parse_number(&record, cols.high),
            low: parse_number(&record, cols.low),
            close: parse_number(&record, cols.close),
            volume: parse_number(&record, cols.volume),
        });
    }
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn name(&self) -> &str {
        "CSV"
    }

    fn load(&self, ticker: &str, range: &DateRange) -> Result<Vec<OhlcvBar>, RetrocastError> {
        let bars: Vec<OhlcvBar> = read_bars(&self.path)?
            .into_iter()
            .filter(|b| range.contains(b.date))
            .collect();
        if bars.is_empty() {
            return Err(RetrocastError::NoData {
                ticker: ticker.to_string(),
                source_name: format!("CSV {}", self.path.display()),
            });
        }
        tracing::debug!(path = %self.path.display(), bars = bars.len(), "read CSV bars");
        Ok(bars)
    }
}
