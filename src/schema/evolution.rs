//! Evolution configuration types for staircase profile search.
//!
//! This module provides the configuration, progress and result types of the
//! generational search that tunes staircase heights for fast ball traversal.

use serde::{Deserialize, Serialize};

use super::WorldConfig;
use crate::compute::Fitness;

/// Top-level configuration for an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// World geometry and physics.
    #[serde(default)]
    pub world: WorldConfig,
    /// Height bounds and smoothing parameters.
    #[serde(default)]
    pub constraints: ProfileConstraints,
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Goal height schedule.
    #[serde(default)]
    pub goal: GoalSchedule,
    /// Episode evaluation settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Mutation probability per step height (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            constraints: ProfileConstraints::default(),
            population: PopulationConfig::default(),
            goal: GoalSchedule::default(),
            evaluation: EvaluationConfig::default(),
            mutation_rate: default_mutation_rate(),
            random_seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Configuration with the run-shaping parameters set and everything else
    /// at defaults.
    pub fn new(
        population_size: usize,
        generation_count: usize,
        survivor_count: usize,
        mutation_rate: f32,
        initial_goal_height: f32,
    ) -> Self {
        Self {
            population: PopulationConfig {
                size: population_size,
                survivors: survivor_count,
                max_generations: generation_count,
                ..Default::default()
            },
            goal: GoalSchedule {
                initial_height: initial_goal_height,
                ..Default::default()
            },
            mutation_rate,
            ..Default::default()
        }
    }
}

fn default_mutation_rate() -> f32 {
    0.05
}

/// Bounds and shaping parameters for height profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConstraints {
    /// Lowest height produced by generation or mutation.
    #[serde(default = "default_min_height")]
    pub min_height: f32,
    /// Highest height; also the fixed height of the first step.
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    /// Half-range of the random walk used when generating a profile.
    #[serde(default = "default_generation_delta")]
    pub generation_delta: f32,
    /// Half-range of a single mutation.
    #[serde(default = "default_mutation_delta")]
    pub mutation_delta: f32,
    /// Moving-average window width; also the length of the head ramp.
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    /// Number of trailing steps eased down toward the ground.
    #[serde(default = "default_transition_length")]
    pub transition_length: usize,
}

impl Default for ProfileConstraints {
    fn default() -> Self {
        Self {
            min_height: default_min_height(),
            max_height: default_max_height(),
            generation_delta: default_generation_delta(),
            mutation_delta: default_mutation_delta(),
            smoothing_window: default_smoothing_window(),
            transition_length: default_transition_length(),
        }
    }
}

fn default_min_height() -> f32 {
    50.0
}
fn default_max_height() -> f32 {
    500.0
}
fn default_generation_delta() -> f32 {
    20.0
}
fn default_mutation_delta() -> f32 {
    50.0
}
fn default_smoothing_window() -> usize {
    10
}
fn default_transition_length() -> usize {
    40
}

/// Population and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of members in every generation.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Members kept as parents after ranking.
    #[serde(default = "default_survivors")]
    pub survivors: usize,
    /// Number of generations to run.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Stop early once the best completion time (seconds) is at or below this.
    #[serde(default)]
    pub target_time: Option<f32>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            survivors: default_survivors(),
            max_generations: default_max_generations(),
            target_time: None,
        }
    }
}

fn default_population_size() -> usize {
    200
}
fn default_survivors() -> usize {
    50
}
fn default_max_generations() -> usize {
    1000
}

/// Goal obstacle height as a function of generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSchedule {
    /// Goal height in generation 0.
    #[serde(default = "default_initial_goal_height")]
    pub initial_height: f32,
    /// Floor the goal never drops below.
    #[serde(default = "default_min_goal_height")]
    pub min_height: f32,
    /// Height removed per generation.
    #[serde(default = "default_goal_decay")]
    pub decay_per_generation: f32,
}

impl Default for GoalSchedule {
    fn default() -> Self {
        Self {
            initial_height: default_initial_goal_height(),
            min_height: default_min_goal_height(),
            decay_per_generation: default_goal_decay(),
        }
    }
}

fn default_initial_goal_height() -> f32 {
    300.0
}
fn default_min_goal_height() -> f32 {
    50.0
}
fn default_goal_decay() -> f32 {
    1.0
}

impl GoalSchedule {
    /// Goal height used while evaluating `generation` (0-based).
    #[inline]
    pub fn height_at(&self, generation: usize) -> f32 {
        (self.initial_height - self.decay_per_generation * generation as f32).max(self.min_height)
    }
}

/// Episode evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Simulated time budget per episode in milliseconds.
    #[serde(default = "default_time_budget_ms")]
    pub time_budget_ms: u64,
    /// Evaluate members of a generation on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: default_time_budget_ms(),
            parallel: default_parallel(),
        }
    }
}

fn default_time_budget_ms() -> u64 {
    1500
}
fn default_parallel() -> bool {
    true
}

impl EvaluationConfig {
    #[inline]
    pub fn time_budget(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.time_budget_ms)
    }
}

// ============================================================================
// Profile Representation
// ============================================================================

/// Ordered step heights, one per staircase step.
///
/// Profiles are values: breeding copies a parent's profile and mutation
/// returns a new one, so no two members share a height buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeightProfile {
    heights: Vec<f32>,
}

impl HeightProfile {
    /// Wrap raw heights without smoothing or clamping.
    pub fn from_heights(heights: Vec<f32>) -> Self {
        Self { heights }
    }

    /// Profile with every step at `height`.
    pub fn flat(steps: usize, height: f32) -> Self {
        Self {
            heights: vec![height; steps],
        }
    }

    /// Number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    #[inline]
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}

impl AsRef<[f32]> for HeightProfile {
    fn as_ref(&self) -> &[f32] {
        &self.heights
    }
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Progress update emitted after every generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Generations completed so far.
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Goal height the last generation was evaluated against.
    pub goal_height: f32,
    /// Members of the last generation that reached the goal.
    pub completed: usize,
    /// Population size.
    pub population_size: usize,
    /// Top-ranked member of the last evaluated generation.
    pub best_candidate: Option<CandidateSnapshot>,
    /// Current phase of the algorithm.
    pub phase: EvolutionPhase,
}

/// Snapshot of a member for reporting and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    /// Unique identifier.
    pub id: u64,
    /// Step heights.
    pub profile: HeightProfile,
    /// Fitness from the member's evaluation.
    pub fitness: Fitness,
    /// Goal height the fitness was measured against.
    pub goal_height: f32,
    /// Generation this member was created in.
    pub generation: usize,
    /// Parent ID (None for the initial population).
    pub parent: Option<u64>,
}

/// Per-generation statistics for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    /// Goal height per generation.
    pub goal_height: Vec<f32>,
    /// Best completion time per generation (None when nobody finished).
    pub best_time: Vec<Option<f32>>,
    /// Highest progress per generation.
    pub best_progress: Vec<f32>,
    /// Number of completed members per generation.
    pub completed: Vec<usize>,
    /// Mean progress per generation.
    pub mean_progress: Vec<f32>,
}

impl EvolutionHistory {
    pub fn len(&self) -> usize {
        self.goal_height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goal_height.is_empty()
    }
}

/// Current phase of the generation loop, as seen between generations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Building the initial population.
    #[default]
    Initializing,
    /// A generation was evaluated and the next population bred from it.
    Breeding,
    /// All generations done.
    Complete,
    /// Stopped before the last generation.
    Stopped,
}

/// Final result of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Top-ranked member of the last evaluated generation. None only when
    /// the run was cancelled before any generation was evaluated.
    pub best: Option<CandidateSnapshot>,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Full history for analysis.
    pub history: EvolutionHistory,
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations evaluated.
    pub generations: usize,
    /// Total episodes run.
    pub total_evaluations: u64,
    /// Best completion time seen in any generation.
    pub best_time: Option<f32>,
    /// Wall-clock time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Episodes per second.
    pub evaluations_per_second: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran the configured number of generations.
    MaxGenerations,
    /// Best completion time reached the target.
    TargetReached,
    /// Cancelled through the cancel handle.
    Cancelled,
}

// ============================================================================
// Validation
// ============================================================================

/// Evolution configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Population size must be non-zero")]
    EmptyPopulation,
    #[error("Survivor count must be non-zero")]
    NoSurvivors,
    #[error("Survivor count {survivors} exceeds population size {size}")]
    TooManySurvivors { survivors: usize, size: usize },
    #[error("Generation count must be non-zero")]
    NoGenerations,
    #[error("Mutation rate {0} must lie in [0, 1]")]
    InvalidMutationRate(f32),
    #[error("Invalid parameter bounds: {0}")]
    InvalidBounds(String),
    #[error("Invalid goal schedule: {0}")]
    InvalidGoalSchedule(String),
    #[error("Time budget must be positive")]
    InvalidTimeBudget,
    #[error("World config validation failed: {0}")]
    WorldConfigError(#[from] super::ConfigError),
}

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        self.world.validate()?;

        let population = &self.population;
        if population.size == 0 {
            return Err(EvolutionConfigError::EmptyPopulation);
        }
        if population.survivors == 0 {
            return Err(EvolutionConfigError::NoSurvivors);
        }
        if population.survivors > population.size {
            return Err(EvolutionConfigError::TooManySurvivors {
                survivors: population.survivors,
                size: population.size,
            });
        }
        if population.max_generations == 0 {
            return Err(EvolutionConfigError::NoGenerations);
        }

        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvolutionConfigError::InvalidMutationRate(
                self.mutation_rate,
            ));
        }

        let c = &self.constraints;
        if c.min_height <= 0.0 || c.min_height > c.max_height {
            return Err(EvolutionConfigError::InvalidBounds(format!(
                "height min ({}) must be positive and not above max ({})",
                c.min_height, c.max_height
            )));
        }
        if c.generation_delta < 0.0 || c.mutation_delta < 0.0 {
            return Err(EvolutionConfigError::InvalidBounds(
                "random deltas must be non-negative".to_string(),
            ));
        }
        if c.smoothing_window == 0 {
            return Err(EvolutionConfigError::InvalidBounds(
                "smoothing window must be non-zero".to_string(),
            ));
        }

        if self.goal.min_height < 0.0 || self.goal.min_height > self.goal.initial_height {
            return Err(EvolutionConfigError::InvalidGoalSchedule(format!(
                "floor ({}) must lie in [0, initial ({})]",
                self.goal.min_height, self.goal.initial_height
            )));
        }
        if self.goal.decay_per_generation < 0.0 {
            return Err(EvolutionConfigError::InvalidGoalSchedule(
                "decay must be non-negative".to_string(),
            ));
        }

        if self.evaluation.time_budget_ms == 0 {
            return Err(EvolutionConfigError::InvalidTimeBudget);
        }

        Ok(())
    }
}
