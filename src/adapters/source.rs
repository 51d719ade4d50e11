//! Data source selection for a scenario.

use crate::adapters::csv_adapter::CsvAdapter;
use crate::domain::error::RetrocastError;
use crate::domain::scenario::{DataSource, Scenario};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

/// Build the `DataPort` named by `scenario.data_source`.
///
/// CSV paths resolve against `[data] csv_dir` when configured. Sources whose
/// integration is not compiled in (or does not exist) yield `SourceUnavailable`.
pub fn data_port_for(
    scenario: &Scenario,
    config: Option<&dyn ConfigPort>,
) -> Result<Box<dyn DataPort>, RetrocastError> {
    match scenario.data_source {
        DataSource::Csv => {
            let csv_path = scenario
                .csv_path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| RetrocastError::scenario("csv_path", "required for CSV data source"))?;
            let base = config.and_then(|c| c.get_path("data", "csv_dir"));
            Ok(Box::new(CsvAdapter::resolve(base.as_deref(), csv_path)))
        }
        DataSource::Yahoo => yahoo(config),
        DataSource::Norgate => Err(RetrocastError::SourceUnavailable {
            source_name: DataSource::Norgate.as_str().to_string(),
            reason: "vendor integration is not available".to_string(),
        }),
    }
}

#[cfg(feature = "yahoo")]
fn yahoo(config: Option<&dyn ConfigPort>) -> Result<Box<dyn DataPort>, RetrocastError> {
    let adapter = crate::adapters::yahoo_adapter::YahooAdapter::from_config(config)?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "yahoo"))]
fn yahoo(_config: Option<&dyn ConfigPort>) -> Result<Box<dyn DataPort>, RetrocastError> {
    Err(RetrocastError::SourceUnavailable {
        source_name: DataSource::Yahoo.as_str().to_string(),
        reason: "built without the `yahoo` feature".to_string(),
    })
}
