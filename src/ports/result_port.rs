//! Analysis result persistence port.

use crate::domain::error::RetrocastError;
use crate::domain::result::AnalysisResult;

/// Keeps at most one result per scenario; saving replaces the previous one.
pub trait ResultPort {
    fn save(&self, result: &AnalysisResult) -> Result<(), RetrocastError>;

    fn latest(&self, scenario_id: &str) -> Result<Option<AnalysisResult>, RetrocastError>;
}
