//! Technical indicator library.
//!
//! - `Indicator`: the closed set of indicator names a scenario may reference
//! - `Params`: the parameter mapping attached to a name in scenario JSON
//! - `IndicatorType`: a name with its parameters resolved and validated
//! - `IndicatorSpec`: name + raw parameters, as carried by conditions
//! - `IndicatorSeries`: a computed series aligned with the price bars
//!
//! Every calculation returns one value per input bar. Bars inside an
//! indicator's warmup window are NaN.

pub mod adx;
pub mod bollinger;
pub mod catalog;
pub mod extremes;
pub mod macd;
pub mod momentum;
pub mod moving_average;
pub mod rsi;
pub mod stochastic;

pub use catalog::{IndicatorInfo, catalog};

use crate::domain::error::RetrocastError;
use crate::domain::indicator_helpers::closes;
use crate::domain::naming;
use crate::domain::ohlcv::OhlcvBar;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Indicator parameters keyed by name; ordered so that naming is stable.
pub type Params = BTreeMap<String, Number>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Indicator {
    Price,
    Sma,
    Ema,
    Rsi,
    BbandsUpper,
    BbandsMiddle,
    BbandsLower,
    Macd,
    MacdSignal,
    MacdHist,
    Atr,
    StochK,
    StochD,
    Adx,
    PriceChange,
    VolumeRatio,
    Highest,
    Lowest,
}

impl Indicator {
    pub const ALL: [Indicator; 18] = [
        Indicator::Price,
        Indicator::Sma,
        Indicator::Ema,
        Indicator::Rsi,
        Indicator::BbandsUpper,
        Indicator::BbandsMiddle,
        Indicator::BbandsLower,
        Indicator::Macd,
        Indicator::MacdSignal,
        Indicator::MacdHist,
        Indicator::Atr,
        Indicator::StochK,
        Indicator::StochD,
        Indicator::Adx,
        Indicator::PriceChange,
        Indicator::VolumeRatio,
        Indicator::Highest,
        Indicator::Lowest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Price => "PRICE",
            Indicator::Sma => "SMA",
            Indicator::Ema => "EMA",
            Indicator::Rsi => "RSI",
            Indicator::BbandsUpper => "BBANDS_UPPER",
            Indicator::BbandsMiddle => "BBANDS_MIDDLE",
            Indicator::BbandsLower => "BBANDS_LOWER",
            Indicator::Macd => "MACD",
            Indicator::MacdSignal => "MACD_SIGNAL",
            Indicator::MacdHist => "MACD_HIST",
            Indicator::Atr => "ATR",
            Indicator::StochK => "STOCH_K",
            Indicator::StochD => "STOCH_D",
            Indicator::Adx => "ADX",
            Indicator::PriceChange => "PRICE_CHANGE",
            Indicator::VolumeRatio => "VOLUME_RATIO",
            Indicator::Highest => "HIGHEST",
            Indicator::Lowest => "LOWEST",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = RetrocastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Indicator::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == upper)
            .ok_or(RetrocastError::InvalidIndicator { name: upper })
    }
}

impl TryFrom<String> for Indicator {
    type Error = RetrocastError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Indicator> for String {
    fn from(value: Indicator) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochLine {
    K,
    D,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Price,
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Adx(usize),
    PriceChange(usize),
    VolumeRatio(usize),
    Highest(usize),
    Lowest(usize),
    Bollinger {
        band: Band,
        period: usize,
        std_dev: f64,
    },
    Macd {
        line: MacdLine,
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        line: StochLine,
        k_period: usize,
        d_period: usize,
    },
}

impl IndicatorType {
    /// Validate `params` for `indicator` and produce the typed form.
    pub fn resolve(indicator: Indicator, params: &Params) -> Result<Self, RetrocastError> {
        let name = indicator.as_str();
        let period = || window_param(name, params, "period", None);

        let resolved = match indicator {
            Indicator::Price => IndicatorType::Price,
            Indicator::Sma => IndicatorType::Sma(period()?),
            Indicator::Ema => IndicatorType::Ema(period()?),
            Indicator::Rsi => IndicatorType::Rsi(period()?),
            Indicator::Atr => IndicatorType::Atr(period()?),
            Indicator::Adx => IndicatorType::Adx(period()?),
            Indicator::PriceChange => IndicatorType::PriceChange(period()?),
            Indicator::VolumeRatio => IndicatorType::VolumeRatio(period()?),
            Indicator::Highest => IndicatorType::Highest(period()?),
            Indicator::Lowest => IndicatorType::Lowest(period()?),
            Indicator::BbandsUpper | Indicator::BbandsMiddle | Indicator::BbandsLower => {
                let band = match indicator {
                    Indicator::BbandsUpper => Band::Upper,
                    Indicator::BbandsMiddle => Band::Middle,
                    _ => Band::Lower,
                };
                IndicatorType::Bollinger {
                    band,
                    period: period()?,
                    std_dev: bollinger_std_param(name, params)?,
                }
            }
            Indicator::Macd | Indicator::MacdSignal | Indicator::MacdHist => {
                let line = match indicator {
                    Indicator::Macd => MacdLine::Line,
                    Indicator::MacdSignal => MacdLine::Signal,
                    _ => MacdLine::Histogram,
                };
                IndicatorType::Macd {
                    line,
                    fast: window_param(name, params, "fast", Some(macd::DEFAULT_FAST))?,
                    slow: window_param(name, params, "slow", Some(macd::DEFAULT_SLOW))?,
                    signal: window_param(name, params, "signal", Some(macd::DEFAULT_SIGNAL))?,
                }
            }
            Indicator::StochK | Indicator::StochD => IndicatorType::Stochastic {
                line: if indicator == Indicator::StochK {
                    StochLine::K
                } else {
                    StochLine::D
                },
                k_period: window_param(name, params, "k", Some(stochastic::DEFAULT_K))?,
                d_period: window_param(name, params, "d", Some(stochastic::DEFAULT_D))?,
            },
        };
        Ok(resolved)
    }

    pub fn calculate(&self, bars: &[OhlcvBar]) -> IndicatorSeries {
        let values = match self {
            IndicatorType::Price => closes(bars),
            IndicatorType::Sma(p) => moving_average::calculate_sma(bars, *p),
            IndicatorType::Ema(p) => moving_average::calculate_ema(bars, *p),
            IndicatorType::Rsi(p) => rsi::calculate_rsi(bars, *p),
            IndicatorType::Atr(p) => crate::domain::indicator_helpers::calc_atr(bars, *p),
            IndicatorType::Adx(p) => adx::calculate_adx(bars, *p),
            IndicatorType::PriceChange(p) => momentum::calculate_price_change(bars, *p),
            IndicatorType::VolumeRatio(p) => momentum::calculate_volume_ratio(bars, *p),
            IndicatorType::Highest(p) => extremes::calculate_highest(bars, *p),
            IndicatorType::Lowest(p) => extremes::calculate_lowest(bars, *p),
            IndicatorType::Bollinger {
                band,
                period,
                std_dev,
            } => bollinger::calculate_bollinger(bars, *period, *std_dev, *band),
            IndicatorType::Macd {
                line,
                fast,
                slow,
                signal,
            } => macd::calculate_macd(bars, *fast, *slow, *signal, *line),
            IndicatorType::Stochastic {
                line,
                k_period,
                d_period,
            } => stochastic::calculate_stochastic(bars, *k_period, *d_period, *line),
        };

        IndicatorSeries {
            indicator_type: self.clone(),
            values,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Price => write!(f, "PRICE"),
            IndicatorType::Sma(p) => write!(f, "SMA({})", p),
            IndicatorType::Ema(p) => write!(f, "EMA({})", p),
            IndicatorType::Rsi(p) => write!(f, "RSI({})", p),
            IndicatorType::Atr(p) => write!(f, "ATR({})", p),
            IndicatorType::Adx(p) => write!(f, "ADX({})", p),
            IndicatorType::PriceChange(p) => write!(f, "PRICE_CHANGE({})", p),
            IndicatorType::VolumeRatio(p) => write!(f, "VOLUME_RATIO({})", p),
            IndicatorType::Highest(p) => write!(f, "HIGHEST({})", p),
            IndicatorType::Lowest(p) => write!(f, "LOWEST({})", p),
            IndicatorType::Bollinger {
                band,
                period,
                std_dev,
            } => {
                let name = match band {
                    Band::Upper => "BBANDS_UPPER",
                    Band::Middle => "BBANDS_MIDDLE",
                    Band::Lower => "BBANDS_LOWER",
                };
                write!(f, "{}({},{})", name, period, std_dev)
            }
            IndicatorType::Macd {
                line,
                fast,
                slow,
                signal,
            } => {
                let name = match line {
                    MacdLine::Line => "MACD",
                    MacdLine::Signal => "MACD_SIGNAL",
                    MacdLine::Histogram => "MACD_HIST",
                };
                write!(f, "{}({},{},{})", name, fast, slow, signal)
            }
            IndicatorType::Stochastic {
                line,
                k_period,
                d_period,
            } => {
                let name = match line {
                    StochLine::K => "STOCH_K",
                    StochLine::D => "STOCH_D",
                };
                write!(f, "{}({},{})", name, k_period, d_period)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<f64>,
}

impl IndicatorSeries {
    /// Number of leading undefined values.
    pub fn warmup(&self) -> usize {
        self.values.iter().take_while(|v| v.is_nan()).count()
    }
}

/// An indicator name with its raw parameters, as referenced by a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub indicator: Indicator,
    #[serde(default)]
    pub params: Params,
}

impl IndicatorSpec {
    pub fn new(indicator: Indicator) -> Self {
        Self {
            indicator,
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Number>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Float parameters that have no exact JSON representation are dropped.
    pub fn with_float_param(mut self, key: &str, value: f64) -> Self {
        if let Some(n) = Number::from_f64(value) {
            self.params.insert(key.to_string(), n);
        }
        self
    }

    pub fn resolve(&self) -> Result<IndicatorType, RetrocastError> {
        IndicatorType::resolve(self.indicator, &self.params)
    }

    /// Dataset key for this indicator.
    pub fn column_name(&self) -> Result<String, RetrocastError> {
        naming::column_name(self.indicator.as_str(), &self.params)
    }

    /// Largest `period` or `slow` parameter; the scan cannot start before it.
    pub fn lookback(&self) -> usize {
        ["period", "slow"]
            .iter()
            .filter_map(|key| self.params.get(*key).and_then(Number::as_u64))
            .max()
            .unwrap_or(0) as usize
    }
}

/// Compute indicator `name` with `params` over `bars`.
pub fn compute(bars: &[OhlcvBar], name: &str, params: &Params) -> Result<Vec<f64>, RetrocastError> {
    let indicator: Indicator = name.parse()?;
    Ok(IndicatorType::resolve(indicator, params)?.calculate(bars).values)
}

fn window_param(
    indicator: &str,
    params: &Params,
    key: &str,
    default: Option<usize>,
) -> Result<usize, RetrocastError> {
    let Some(raw) = params.get(key) else {
        return default.ok_or_else(|| {
            RetrocastError::params(indicator, format!("missing required parameter '{key}'"))
        });
    };
    match raw.as_u64() {
        Some(v) if v >= 1 => Ok(v as usize),
        _ => Err(RetrocastError::params(
            indicator,
            format!("'{key}' must be a positive integer, got {raw}"),
        )),
    }
}

fn bollinger_std_param(indicator: &str, params: &Params) -> Result<f64, RetrocastError> {
    match params.get("std") {
        None => Ok(bollinger::DEFAULT_STD),
        Some(raw) => match raw.as_f64() {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(RetrocastError::params(
                indicator,
                format!("'std' must be a non-negative number, got {raw}"),
            )),
        },
    }
}
