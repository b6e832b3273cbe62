//! Core domain types and logic.

pub mod bar;
pub mod interval;
pub mod pattern;
pub mod filter;
pub mod filter_config;
pub mod pipeline;
pub mod universe;
pub mod config_validation;
pub mod error;
