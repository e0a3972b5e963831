//! Staircase Evo - evolving staircase profiles for a bouncing ball.
//!
//! A ball is dropped onto a row of rectangular steps. It bounces and rolls
//! under gravity until it touches a goal block or runs out of time. A
//! generational search evolves the step heights so the ball reaches the goal
//! as fast as possible, while the goal itself shrinks over the generations.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Configuration, profiles and result types
//! - `compute`: Geometry, ball physics, episodes and the evolutionary search
//! - `replay`: Recording episodes for playback
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use staircase_evo::{
//!     compute::EpisodeRunner,
//!     schema::{EvolutionConfig, WorldConfig},
//! };
//!
//! // Score a single staircase
//! let world = WorldConfig::default();
//! let heights: Vec<f32> = (0..world.steps)
//!     .map(|i| 500.0 * (world.steps - i) as f32 / world.steps as f32)
//!     .collect();
//! let runner = EpisodeRunner::new(world);
//! let fitness = runner.evaluate(&heights, 300.0, Duration::from_millis(1500));
//! println!("Ramp: {}", fitness);
//!
//! // Evolve a population
//! let config = EvolutionConfig::new(50, 10, 10, 0.05, 300.0);
//! let result = staircase_evo::evolve(config).expect("valid config");
//! println!("Stopped after {} generations", result.stats.generations);
//! ```

pub mod compute;
pub mod replay;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, evolve};
pub use compute::{EpisodeRunner, Fitness};
pub use schema::{EvolutionConfig, EvolutionResult, HeightProfile, WorldConfig};
