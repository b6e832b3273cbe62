//! Port traits implemented by adapters.

pub mod config_port;
pub mod market_data_port;
pub mod universe_port;
