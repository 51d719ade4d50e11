//! Analysis core: indicators, conditions, signal scanning, target outcomes
//! and statistics. Nothing in here performs I/O beyond `Scenario::load`.

pub mod error;
pub mod ohlcv;
pub mod indicator;
pub mod indicator_helpers;
pub mod naming;
pub mod dataset;
pub mod condition;
pub mod condition_eval;
pub mod scanner;
pub mod target;
pub mod result;
pub mod stats;
pub mod scenario;
pub mod scenario_validation;
pub mod engine;
