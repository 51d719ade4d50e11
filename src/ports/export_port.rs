//! Tabular export port.

use crate::domain::error::RetrocastError;
use crate::domain::result::AnalysisResult;
use std::path::Path;

/// Port for flattening analysis results into downloadable tables.
pub trait ExportPort {
    /// One row per signal × target.
    fn write_signals(&self, result: &AnalysisResult, output_path: &Path) -> Result<(), RetrocastError>;

    /// One row per target with its aggregate statistics.
    fn write_summary(&self, result: &AnalysisResult, output_path: &Path) -> Result<(), RetrocastError>;
}
