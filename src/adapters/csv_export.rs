//! CSV export of analysis results.

use crate::domain::error::RetrocastError;
use crate::domain::result::AnalysisResult;
use crate::ports::export_port::ExportPort;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

const SIGNAL_COLUMNS: [&str; 11] = [
    "signal_date",
    "signal_price",
    "target_id",
    "target_days_forward",
    "target_threshold_pct",
    "target_direction",
    "future_date",
    "future_price",
    "actual_change_pct",
    "max_change_pct",
    "hit",
];

const SUMMARY_COLUMNS: [&str; 17] = [
    "target_id",
    "days_forward",
    "threshold_pct",
    "direction",
    "total_evaluable",
    "hit_count",
    "miss_count",
    "hit_rate_pct",
    "avg_change_pct",
    "median_change_pct",
    "max_change_pct",
    "min_change_pct",
    "std_dev",
    "percentile_5",
    "percentile_25",
    "percentile_75",
    "percentile_95",
];

pub struct CsvExporter;

fn csv_err(e: csv::Error) -> RetrocastError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => RetrocastError::Io(io),
        other => RetrocastError::DataFormat {
            reason: format!("CSV write error: {other:?}"),
        },
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvExporter {
    pub fn signals_to_writer<W: Write>(result: &AnalysisResult, out: W) -> Result<(), RetrocastError> {
        let indicator_columns: BTreeSet<&str> = result
            .signals
            .iter()
            .flat_map(|s| s.indicator_values.keys().map(String::as_str))
            .collect();

        let mut wtr = csv::Writer::from_writer(out);
        let header = SIGNAL_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(indicator_columns.iter().map(|c| format!("ind_{c}")));
        wtr.write_record(header).map_err(csv_err)?;

        for signal in &result.signals {
            let indicators: Vec<String> = indicator_columns
                .iter()
                .map(|c| opt(signal.indicator_values.get(*c)))
                .collect();
            for outcome in &signal.outcomes {
                let row = [
                    signal.date.to_string(),
                    signal.price.to_string(),
                    outcome.target_id.clone(),
                    outcome.days_forward.to_string(),
                    outcome.threshold_pct.to_string(),
                    outcome.direction.as_str().to_string(),
                    opt(outcome.future_date),
                    opt(outcome.future_price),
                    opt(outcome.actual_change_pct),
                    opt(outcome.max_change_pct),
                    opt(outcome.hit),
                ];
                wtr.write_record(row.iter().chain(indicators.iter()))
                    .map_err(csv_err)?;
            }
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn summary_to_writer<W: Write>(result: &AnalysisResult, out: W) -> Result<(), RetrocastError> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(SUMMARY_COLUMNS).map_err(csv_err)?;
        for s in &result.target_stats {
            wtr.write_record([
                s.target_id.clone(),
                s.days_forward.to_string(),
                s.threshold_pct.to_string(),
                s.direction.as_str().to_string(),
                s.total_evaluable.to_string(),
                s.hit_count.to_string(),
                s.miss_count.to_string(),
                s.hit_rate_pct.to_string(),
                s.avg_change_pct.to_string(),
                s.median_change_pct.to_string(),
                s.max_change_pct.to_string(),
                s.min_change_pct.to_string(),
                s.std_dev.to_string(),
                s.percentile_5.to_string(),
                s.percentile_25.to_string(),
                s.percentile_75.to_string(),
                s.percentile_95.to_string(),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ExportPort for CsvExporter {
    fn write_signals(&self, result: &AnalysisResult, output_path: &Path) -> Result<(), RetrocastError> {
        let file = std::fs::File::create(output_path)?;
        Self::signals_to_writer(result, file)?;
        tracing::info!(path = %output_path.display(), signals = result.signals.len(), "signals exported");
        Ok(())
    }

    fn write_summary(&self, result: &AnalysisResult, output_path: &Path) -> Result<(), RetrocastError> {
        let file = std::fs::File::create(output_path)?;
        Self::summary_to_writer(result, file)?;
        tracing::info!(path = %output_path.display(), targets = result.target_stats.len(), "summary exported");
        Ok(())
    }
}
