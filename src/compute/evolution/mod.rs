//! Evolutionary search over staircase height profiles.
//!
//! # Overview
//!
//! The search system consists of:
//!
//! - **Profile Operations** (`profile`): Random generation, smoothing, and mutation
//! - **Search Loop** (`search`): Evaluate, rank, select, and breed generations
//!
//! Selection is truncation to the top survivors; every child is a mutated
//! copy of one survivor. There is no crossover.
//!
//! # Example
//!
//! ```rust,no_run
//! use staircase_evo::schema::EvolutionConfig;
//! use staircase_evo::compute::evolution::EvolutionEngine;
//!
//! let config = EvolutionConfig::new(50, 20, 10, 0.05, 300.0);
//!
//! let mut engine = EvolutionEngine::new(config).expect("valid config");
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: {} completed", progress.generation, progress.completed);
//! });
//!
//! if let Some(best) = result.best {
//!     println!("Best member: {}", best.fitness);
//! }
//! ```

mod profile;
mod search;

pub use profile::{ProfileRng, smooth};
pub use search::{EvolutionEngine, Member, evolve, rank_members};
