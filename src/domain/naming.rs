//! Column naming for computed indicator series.
//!
//! The name doubles as the dataset cache key, so conditions that reference
//! the same indicator with the same parameters always resolve to the same
//! column without coordination.

use crate::domain::error::RetrocastError;
use crate::domain::indicator::{Indicator, Params, bollinger, macd, stochastic};
use serde_json::Number;

/// Column holding close prices; also the name of the PRICE indicator.
pub const PRICE_COLUMN: &str = "close";

pub fn column_name(indicator: &str, params: &Params) -> Result<String, RetrocastError> {
    let upper = indicator.trim().to_uppercase();
    let Ok(known) = upper.parse::<Indicator>() else {
        return Ok(fallback_name(&upper, params));
    };

    let name = match known {
        Indicator::Price => PRICE_COLUMN.to_string(),
        Indicator::Sma
        | Indicator::Ema
        | Indicator::Rsi
        | Indicator::Atr
        | Indicator::Adx
        | Indicator::PriceChange
        | Indicator::VolumeRatio
        | Indicator::Highest
        | Indicator::Lowest => {
            format!("{upper}_{}", required(&upper, params, "period")?)
        }
        Indicator::BbandsUpper | Indicator::BbandsMiddle | Indicator::BbandsLower => {
            let std = params
                .get("std")
                .and_then(Number::as_f64)
                .unwrap_or(bollinger::DEFAULT_STD);
            format!("{upper}_{}_{std:?}", required(&upper, params, "period")?)
        }
        Indicator::Macd | Indicator::MacdSignal | Indicator::MacdHist => format!(
            "{upper}_{}_{}_{}",
            optional(params, "fast", macd::DEFAULT_FAST),
            optional(params, "slow", macd::DEFAULT_SLOW),
            optional(params, "signal", macd::DEFAULT_SIGNAL),
        ),
        Indicator::StochK | Indicator::StochD => format!(
            "{upper}_{}_{}",
            optional(params, "k", stochastic::DEFAULT_K),
            optional(params, "d", stochastic::DEFAULT_D),
        ),
    };
    Ok(name)
}

fn required(indicator: &str, params: &Params, key: &str) -> Result<String, RetrocastError> {
    params
        .get(key)
        .map(Number::to_string)
        .ok_or_else(|| RetrocastError::params(indicator, format!("missing required parameter '{key}'")))
}

fn optional(params: &Params, key: &str, default: usize) -> String {
    params
        .get(key)
        .map(Number::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn fallback_name(upper: &str, params: &Params) -> String {
    // BTreeMap iterates in key order
    std::iter::once(upper.to_string())
        .chain(params.values().map(Number::to_string))
        .collect::<Vec<_>>()
        .join("_")
}
