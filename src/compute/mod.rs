//! Compute module - Deterministic simulation and search for staircase evolution.

mod body;
mod episode;
mod geometry;

pub mod evolution;

pub use body::*;
pub use episode::*;
pub use geometry::*;
