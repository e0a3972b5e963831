//! Schema module - Configuration, profile and result types for staircase evolution.

mod config;
mod evolution;

pub use config::*;
pub use evolution::*;
