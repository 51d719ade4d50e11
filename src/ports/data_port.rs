//! Price data access port.

use crate::domain::error::RetrocastError;
use crate::domain::ohlcv::{DateRange, OhlcvBar};

/// One implementation per data source. Implementations should return
/// `SourceUnavailable` when the source itself cannot be used and `NoData`
/// when it works but has nothing for the request.
pub trait DataPort {
    /// Short source label used in logs and errors.
    fn name(&self) -> &str;

    /// Daily bars for `ticker` within `range`. Ordering and de-duplication
    /// are not required; the engine normalises the result.
    fn load(&self, ticker: &str, range: &DateRange) -> Result<Vec<OhlcvBar>, RetrocastError>;
}
