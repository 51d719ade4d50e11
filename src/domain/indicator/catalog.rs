//! Descriptive catalogue of the supported indicators.

use crate::domain::indicator::Indicator;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Price,
    Trend,
    Momentum,
    Volatility,
    Volume,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamInfo {
    pub name: &'static str,
    pub default: f64,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorInfo {
    pub indicator: Indicator,
    pub label: &'static str,
    pub category: Category,
    pub params: Vec<ParamInfo>,
}

fn required(name: &'static str, default: f64) -> ParamInfo {
    ParamInfo {
        name,
        default,
        required: true,
    }
}

fn optional(name: &'static str, default: f64) -> ParamInfo {
    ParamInfo {
        name,
        default,
        required: false,
    }
}

pub fn describe(indicator: Indicator) -> IndicatorInfo {
    let (label, category, params) = match indicator {
        Indicator::Price => ("Price (close)", Category::Price, vec![]),
        Indicator::Sma => ("Simple Moving Average", Category::Trend, vec![required("period", 200.0)]),
        Indicator::Ema => ("Exponential Moving Average", Category::Trend, vec![required("period", 50.0)]),
        Indicator::Rsi => ("Relative Strength Index", Category::Momentum, vec![required("period", 14.0)]),
        Indicator::BbandsUpper => ("Bollinger Upper Band", Category::Volatility, bollinger_params()),
        Indicator::BbandsMiddle => ("Bollinger Middle Band", Category::Volatility, bollinger_params()),
        Indicator::BbandsLower => ("Bollinger Lower Band", Category::Volatility, bollinger_params()),
        Indicator::Macd => ("MACD Line", Category::Momentum, macd_params()),
        Indicator::MacdSignal => ("MACD Signal", Category::Momentum, macd_params()),
        Indicator::MacdHist => ("MACD Histogram", Category::Momentum, macd_params()),
        Indicator::Atr => ("Average True Range", Category::Volatility, vec![required("period", 14.0)]),
        Indicator::StochK => ("Stochastic %K", Category::Momentum, stoch_params()),
        Indicator::StochD => ("Stochastic %D", Category::Momentum, stoch_params()),
        Indicator::Adx => ("Average Directional Index", Category::Trend, vec![required("period", 14.0)]),
        Indicator::PriceChange => ("Price Change %", Category::Momentum, vec![required("period", 1.0)]),
        Indicator::VolumeRatio => ("Volume Ratio", Category::Volume, vec![required("period", 20.0)]),
        Indicator::Highest => ("Highest Close", Category::Price, vec![required("period", 252.0)]),
        Indicator::Lowest => ("Lowest Close", Category::Price, vec![required("period", 252.0)]),
    };
    IndicatorInfo {
        indicator,
        label,
        category,
        params,
    }
}

fn bollinger_params() -> Vec<ParamInfo> {
    vec![
        required("period", 20.0),
        optional("std", super::bollinger::DEFAULT_STD),
    ]
}

fn macd_params() -> Vec<ParamInfo> {
    vec![
        optional("fast", super::macd::DEFAULT_FAST as f64),
        optional("slow", super::macd::DEFAULT_SLOW as f64),
        optional("signal", super::macd::DEFAULT_SIGNAL as f64),
    ]
}

fn stoch_params() -> Vec<ParamInfo> {
    vec![
        optional("k", super::stochastic::DEFAULT_K as f64),
        optional("d", super::stochastic::DEFAULT_D as f64),
    ]
}

pub fn catalog() -> Vec<IndicatorInfo> {
    Indicator::ALL.iter().map(|&i| describe(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_indicator_is_listed_once() {
        let all = catalog();
        assert_eq!(all.len(), Indicator::ALL.len());
        assert_eq!(all[0].indicator, Indicator::Price);
    }

    #[test]
    fn only_window_params_are_required() {
        for info in catalog() {
            for p in &info.params {
                assert_eq!(p.required, p.name == "period", "{} {}", info.indicator, p.name);
            }
        }
    }

    #[test]
    fn macd_defaults() {
        let info = describe(Indicator::MacdHist);
        let defaults: Vec<f64> = info.params.iter().map(|p| p.default).collect();
        assert_eq!(defaults, vec![12.0, 26.0, 9.0]);
    }
}
