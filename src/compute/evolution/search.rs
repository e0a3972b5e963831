//! Generational search over staircase height profiles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use rayon::prelude::*;

use crate::compute::{EpisodeRunner, Fitness};
use crate::schema::{
    CandidateSnapshot, EvolutionConfig, EvolutionConfigError, EvolutionHistory, EvolutionPhase,
    EvolutionProgress, EvolutionResult, EvolutionStats, HeightProfile, StopReason,
};

use super::profile::{ProfileRng, smooth};

/// A member of the population.
#[derive(Debug, Clone)]
pub struct Member {
    /// Unique identifier.
    pub id: u64,
    /// Step heights.
    pub profile: HeightProfile,
    /// Last evaluation result, or the parent's for a fresh child.
    pub fitness: Fitness,
    /// Generation created.
    pub generation: usize,
    /// Parent ID.
    pub parent: Option<u64>,
}

impl Member {
    /// Convert to snapshot for serialization.
    pub fn to_snapshot(&self, goal_height: f32) -> CandidateSnapshot {
        CandidateSnapshot {
            id: self.id,
            profile: self.profile.clone(),
            fitness: self.fitness,
            goal_height,
            generation: self.generation,
            parent: self.parent,
        }
    }
}

/// Sort members best-first. The sort is stable, so equal fitness keeps
/// population order.
pub fn rank_members(members: &mut [Member]) {
    members.sort_by(|a, b| a.fitness.rank_cmp(&b.fitness));
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    rng: ProfileRng,
    runner: EpisodeRunner,
    population: Vec<Member>,
    history: EvolutionHistory,
    generation: usize,
    phase: EvolutionPhase,
    /// Top of the last ranking and the goal height it was evaluated at.
    best: Option<(Member, f32)>,
    best_time: Option<f32>,
    last_completed: usize,
    next_id: u64,
    cancelled: Arc<AtomicBool>,
}

impl EvolutionEngine {
    /// Create a new evolution engine. Fails if the configuration is invalid.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionConfigError> {
        config.validate()?;

        let rng = match config.random_seed {
            Some(seed) => ProfileRng::new(seed),
            None => ProfileRng::random(),
        };
        let runner = EpisodeRunner::new(config.world.clone());

        Ok(Self {
            config,
            rng,
            runner,
            population: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            phase: EvolutionPhase::Initializing,
            best: None,
            best_time: None,
            last_completed: 0,
            next_id: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Current population in its present order.
    pub fn population(&self) -> &[Member] {
        &self.population
    }

    /// Number of generations evaluated so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Goal height for the generation about to be evaluated.
    pub fn goal_height(&self) -> f32 {
        self.config.goal.height_at(self.generation)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Initialize the population.
    pub fn initialize(&mut self) {
        self.population.clear();
        self.history = EvolutionHistory::default();
        self.generation = 0;
        self.best = None;
        self.best_time = None;
        self.phase = EvolutionPhase::Initializing;

        let steps = self.config.world.steps;
        for _ in 0..self.config.population.size {
            let profile = self.rng.generate(steps, &self.config.constraints);
            let id = self.next_id();

            self.population.push(Member {
                id,
                profile,
                fitness: Fitness::unevaluated(),
                generation: 0,
                parent: None,
            });
        }
    }

    /// Evaluate all members against `goal_height`.
    fn evaluate_population(&mut self, goal_height: f32) {
        let runner = &self.runner;
        let budget = self.config.evaluation.time_budget();

        if self.config.evaluation.parallel {
            // Results land in each member's own slot, so order is preserved.
            self.population.par_iter_mut().for_each(|member| {
                member.fitness = runner.evaluate(member.profile.heights(), goal_height, budget);
            });
        } else {
            for member in &mut self.population {
                member.fitness = runner.evaluate(member.profile.heights(), goal_height, budget);
            }
        }

        let size = self.population.len();
        for (i, member) in self.population.iter().enumerate() {
            debug!("Member {}/{} (id {}): {}", i + 1, size, member.id, member.fitness);
        }
    }

    /// Record statistics for the freshly ranked population.
    fn record_history(&mut self, goal_height: f32) {
        let completed = self
            .population
            .iter()
            .filter(|m| m.fitness.is_complete())
            .count();
        let best_progress = self
            .population
            .iter()
            .map(|m| m.fitness.progress)
            .fold(0.0f32, f32::max);
        let mean_progress = self
            .population
            .iter()
            .map(|m| m.fitness.progress)
            .sum::<f32>()
            / self.population.len() as f32;
        let best_time = self.population.first().and_then(|m| m.fitness.completion_time);

        self.history.goal_height.push(goal_height);
        self.history.best_time.push(best_time);
        self.history.best_progress.push(best_progress);
        self.history.completed.push(completed);
        self.history.mean_progress.push(mean_progress);
        self.last_completed = completed;

        if let Some(t) = best_time {
            self.best_time = Some(self.best_time.map_or(t, |b| b.min(t)));
        }
    }

    /// Breed the next population from the top `survivors` members.
    ///
    /// Every child copies a uniformly chosen survivor, inherits its fitness
    /// as a placeholder and is mutated. The copied profile is smoothed
    /// once on its own and again after mutation. Parents may be chosen
    /// repeatedly.
    fn breed(&mut self) {
        let survivor_count = self.config.population.survivors.min(self.population.len());
        let mut survivors = std::mem::take(&mut self.population);
        survivors.truncate(survivor_count);

        let size = self.config.population.size;
        let mut next_gen = Vec::with_capacity(size);

        while next_gen.len() < size {
            let parent = &survivors[self.rng.index(survivors.len())];
            let copied = HeightProfile::from_heights(smooth(
                parent.profile.heights(),
                &self.config.constraints,
            ));
            let profile = self.rng.mutate(
                &copied,
                self.config.mutation_rate,
                &self.config.constraints,
            );
            let fitness = parent.fitness;
            let parent_id = parent.id;
            let id = self.next_id();

            next_gen.push(Member {
                id,
                profile,
                fitness,
                generation: self.generation + 1,
                parent: Some(parent_id),
            });
        }

        self.population = next_gen;
        self.phase = EvolutionPhase::Breeding;
    }

    /// Run a single generation: evaluate, rank, select, breed.
    pub fn step_generation(&mut self) {
        let goal_height = self.goal_height();
        info!(
            "Generation {} - Goal Height: {:.1}",
            self.generation + 1,
            goal_height
        );

        self.evaluate_population(goal_height);

        rank_members(&mut self.population);
        self.record_history(goal_height);

        if let Some(top) = self.population.first() {
            info!(
                "Generation {} best: {} ({}/{} completed)",
                self.generation + 1,
                top.fitness,
                self.last_completed,
                self.population.len()
            );
            self.best = Some((top.clone(), goal_height));
        }

        self.breed();
        self.generation += 1;
    }

    /// Get current progress.
    pub fn progress(&self) -> EvolutionProgress {
        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.population.max_generations,
            goal_height: self
                .best
                .as_ref()
                .map_or_else(|| self.goal_height(), |(_, goal)| *goal),
            completed: self.last_completed,
            population_size: self.population.len(),
            best_candidate: self.best_snapshot(),
            phase: self.phase,
        }
    }

    fn best_snapshot(&self) -> Option<CandidateSnapshot> {
        self.best
            .as_ref()
            .map(|(member, goal)| member.to_snapshot(*goal))
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if self.generation >= self.config.population.max_generations {
            return Some(StopReason::MaxGenerations);
        }

        if let Some(target) = self.config.population.target_time
            && self.best_time.is_some_and(|t| t <= target)
        {
            return Some(StopReason::TargetReached);
        }

        None
    }

    /// Run evolution with progress callback invoked after every generation.
    pub fn run_with_callback<F>(&mut self, callback: F) -> EvolutionResult
    where
        F: Fn(&EvolutionProgress),
    {
        let start_time = std::time::Instant::now();

        self.initialize();

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }

            self.step_generation();
            callback(&self.progress());
        };

        self.phase = match stop_reason {
            StopReason::MaxGenerations => EvolutionPhase::Complete,
            _ => EvolutionPhase::Stopped,
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        let total_evaluations = self.generation as u64 * self.config.population.size as u64;

        let best = self.best_snapshot();
        match &best {
            Some(b) => info!("Best overall: {} (goal height {:.1})", b.fitness, b.goal_height),
            None => info!("Stopped before any generation was evaluated"),
        }

        EvolutionResult {
            best,
            stats: EvolutionStats {
                generations: self.generation,
                total_evaluations,
                best_time: self.best_time,
                elapsed_seconds: elapsed,
                evaluations_per_second: if elapsed > 0.0 {
                    total_evaluations as f64 / elapsed
                } else {
                    0.0
                },
                stop_reason,
            },
            history: self.history.clone(),
        }
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(|_| {})
    }
}

/// Validate `config` and run a complete evolution.
pub fn evolve(config: EvolutionConfig) -> Result<EvolutionResult, EvolutionConfigError> {
    let mut engine = EvolutionEngine::new(config)?;
    Ok(engine.run())
}
