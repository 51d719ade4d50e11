//! Port traits: the boundaries between the analysis core and the outside world.

pub mod config_port;
pub mod data_port;
pub mod export_port;
pub mod result_port;
