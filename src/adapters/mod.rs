//! Concrete adapter implementations for ports.

pub mod caching_adapter;
pub mod csv_adapter;
pub mod csv_universe_adapter;
pub mod file_config_adapter;
