//! retrocast: historical signal analysis for rule-based trading ideas.
//!
//! Hexagonal architecture: the analysis core lives in [`domain`], port traits
//! in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
