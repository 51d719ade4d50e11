//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_export::CsvExporter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::source::data_port_for;
use crate::domain::condition::{Comparison, Condition, Operator};
use crate::domain::condition_eval::build_groups;
use crate::domain::engine::run_analysis;
use crate::domain::error::RetrocastError;
use crate::domain::indicator::catalog;
use crate::domain::naming::PRICE_COLUMN;
use crate::domain::result::AnalysisResult;
use crate::domain::scenario::Scenario;
use crate::domain::scenario_validation::validate_scenario;
use crate::logging::{LogFormat, init_logging};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::export_port::ExportPort;
use crate::ports::result_port::ResultPort;

#[derive(Parser, Debug)]
#[command(name = "retrocast", about = "Historical signal analysis for rule-based trading ideas")]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse a scenario
    Run {
        #[arg(short, long)]
        scenario: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Result JSON path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        signals_csv: Option<PathBuf>,
        #[arg(long)]
        summary_csv: Option<PathBuf>,
    },
    /// Validate a scenario without loading data
    Validate {
        #[arg(short, long)]
        scenario: PathBuf,
    },
    /// Print the cached result for a scenario
    Last {
        #[arg(long)]
        scenario_id: String,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Export the cached result for a scenario as CSV
    Export {
        #[arg(long)]
        scenario_id: String,
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Per-target summary instead of per-signal rows
        #[arg(long)]
        summary: bool,
    },
    /// List supported indicators
    Indicators,
}

impl Command {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Run { config, .. } => config.as_deref(),
            Command::Last { config, .. } | Command::Export { config, .. } => Some(config),
            Command::Validate { .. } | Command::Indicators => None,
        }
    }
}

/// Output destinations for `run`.
#[derive(Debug, Default, Clone)]
pub struct RunOutputs {
    pub output: Option<PathBuf>,
    pub signals_csv: Option<PathBuf>,
    pub summary_csv: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match cli.command.config_path().map(load_config).transpose() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let config_port = config.as_ref().map(|c| c as &dyn ConfigPort);
    init_logging(LogFormat::select(cli.log_json, config_port));

    let outcome = match cli.command {
        Command::Run {
            scenario,
            output,
            signals_csv,
            summary_csv,
            ..
        } => run_scenario(
            &scenario,
            config_port,
            &RunOutputs {
                output,
                signals_csv,
                summary_csv,
            },
        ),
        Command::Validate { scenario } => run_validate(&scenario),
        Command::Last { scenario_id, .. } => run_last(&scenario_id, config_port),
        Command::Export {
            scenario_id,
            output,
            summary,
            ..
        } => run_export(&scenario_id, config_port, &output, summary),
        Command::Indicators => {
            print!("{}", format_catalog());
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, RetrocastError> {
    FileConfigAdapter::from_file(path)
}

/// The SQLite cache when `[storage] db_path` is configured, otherwise `None`.
#[cfg(feature = "sqlite")]
pub fn result_store(
    config: Option<&dyn ConfigPort>,
) -> Result<Option<Box<dyn ResultPort>>, RetrocastError> {
    use crate::adapters::sqlite_adapter::SqliteResultStore;

    match config {
        Some(c) if c.get_path("storage", "db_path").is_some() => {
            Ok(Some(Box::new(SqliteResultStore::from_config(c)?)))
        }
        _ => Ok(None),
    }
}

#[cfg(not(feature = "sqlite"))]
pub fn result_store(
    config: Option<&dyn ConfigPort>,
) -> Result<Option<Box<dyn ResultPort>>, RetrocastError> {
    if config.is_some_and(|c| c.get_path("storage", "db_path").is_some()) {
        tracing::warn!("[storage] db_path is set but retrocast was built without the `sqlite` feature");
    }
    Ok(None)
}

fn require_store(config: Option<&dyn ConfigPort>) -> Result<Box<dyn ResultPort>, RetrocastError> {
    result_store(config)?.ok_or_else(|| RetrocastError::ConfigMissing {
        section: "storage".into(),
        key: "db_path".into(),
    })
}

fn run_scenario(
    scenario_path: &Path,
    config: Option<&dyn ConfigPort>,
    outputs: &RunOutputs,
) -> Result<(), RetrocastError> {
    eprintln!("Loading scenario from {}", scenario_path.display());
    let scenario = Scenario::load(scenario_path)?;
    let data = data_port_for(&scenario, config)?;
    let store = result_store(config)?;
    execute(&scenario, data.as_ref(), store.as_deref(), outputs)?;
    Ok(())
}

/// Analyse `scenario`, print the summary, write every requested output and
/// cache the result when a store is given.
pub fn execute(
    scenario: &Scenario,
    data: &dyn DataPort,
    store: Option<&dyn ResultPort>,
    outputs: &RunOutputs,
) -> Result<AnalysisResult, RetrocastError> {
    let result = run_analysis(scenario, data)?;
    eprint!("{}", format_summary(&result));

    let json = result.to_json_pretty()?;
    match &outputs.output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("Result written to: {}", path.display());
        }
        None => println!("{json}"),
    }
    if let Some(path) = &outputs.signals_csv {
        CsvExporter.write_signals(&result, path)?;
    }
    if let Some(path) = &outputs.summary_csv {
        CsvExporter.write_summary(&result, path)?;
    }
    if let Some(store) = store {
        store.save(&result)?;
    }
    Ok(result)
}

fn run_validate(scenario_path: &Path) -> Result<(), RetrocastError> {
    let scenario = Scenario::load(scenario_path)?;
    validate_scenario(&scenario)?;
    print!("{}", format_validation(&scenario)?);
    Ok(())
}

fn run_last(scenario_id: &str, config: Option<&dyn ConfigPort>) -> Result<(), RetrocastError> {
    let store = require_store(config)?;
    let result = cached(store.as_ref(), scenario_id)?;
    println!("{}", result.to_json_pretty()?);
    Ok(())
}

fn run_export(
    scenario_id: &str,
    config: Option<&dyn ConfigPort>,
    output: &Path,
    summary: bool,
) -> Result<(), RetrocastError> {
    let store = require_store(config)?;
    let result = cached(store.as_ref(), scenario_id)?;
    if summary {
        CsvExporter.write_summary(&result, output)?;
    } else {
        CsvExporter.write_signals(&result, output)?;
    }
    eprintln!("Export written to: {}", output.display());
    Ok(())
}

pub fn cached(store: &dyn ResultPort, scenario_id: &str) -> Result<AnalysisResult, RetrocastError> {
    store
        .latest(scenario_id)?
        .ok_or_else(|| RetrocastError::Storage {
            reason: format!("no cached result for scenario '{scenario_id}'"),
        })
}

pub fn format_summary(result: &AnalysisResult) -> String {
    let mut out = format!(
        "\n=== {} ({}) ===\nData:     {} to {} ({} bars)\nSignals:  {}\n",
        result.scenario_name,
        result.underlying,
        result.data_start,
        result.data_end,
        result.total_bars,
        result.total_signals,
    );
    for s in &result.target_stats {
        out.push_str(&format!(
            "  {}: {} {}% in {}d  {}/{} hits ({:.2}%), avg {:.2}%, median {:.2}%\n",
            s.target_id,
            s.direction.as_str(),
            s.threshold_pct,
            s.days_forward,
            s.hit_count,
            s.total_evaluable,
            s.hit_rate_pct,
            s.avg_change_pct,
            s.median_change_pct,
        ));
    }
    out
}

fn operator_label(op: Operator) -> &'static str {
    match op {
        Operator::Above => ">",
        Operator::Below => "<",
        Operator::CrossesAbove => "crosses above",
        Operator::CrossesBelow => "crosses below",
    }
}

pub fn describe_condition(condition: &Condition) -> Result<String, RetrocastError> {
    let right = match &condition.compare {
        Comparison::Price => PRICE_COLUMN.to_string(),
        Comparison::Value(v) => v.to_string(),
        Comparison::Indicator(spec) => spec.column_name()?,
    };
    Ok(format!(
        "{} {} {}",
        condition.indicator.column_name()?,
        operator_label(condition.operator),
        right
    ))
}

/// Indicator columns and the OR-of-ANDs grouping the scan will evaluate.
pub fn format_validation(scenario: &Scenario) -> Result<String, RetrocastError> {
    let mut columns: Vec<String> = Vec::new();
    for spec in scenario.indicator_specs() {
        let name = spec.column_name()?;
        if name != PRICE_COLUMN && !columns.contains(&name) {
            columns.push(name);
        }
    }

    let mut groups = Vec::new();
    for group in build_groups(&scenario.conditions) {
        let parts = group
            .iter()
            .map(describe_condition)
            .collect::<Result<Vec<_>, _>>()?;
        groups.push(format!("({})", parts.join(" AND ")));
    }

    Ok(format!(
        "Scenario '{}' is valid\nColumns:  {}\nSignal:   {}\nTargets:  {}\n",
        scenario.name,
        if columns.is_empty() {
            "(none)".to_string()
        } else {
            columns.join(", ")
        },
        groups.join(" OR "),
        scenario.targets.len(),
    ))
}

pub fn format_catalog() -> String {
    let mut out = String::new();
    for info in catalog() {
        let params = info
            .params
            .iter()
            .map(|p| {
                if p.required {
                    format!("{} (e.g. {})", p.name, p.default)
                } else {
                    format!("{}={}", p.name, p.default)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{:<14} {:<28} {:<11} {}\n",
            info.indicator.as_str(),
            info.label,
            format!("{:?}", info.category).to_lowercase(),
            params
        ));
    }
    out
}
