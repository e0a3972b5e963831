//! Episode runner - drives the integrator until the goal is reached or time runs out.
//!
//! An episode is a pure function of (profile, goal height, time budget): no
//! randomness is consumed and no state is shared between episodes, so
//! episodes of one generation may run on any number of threads.

use std::cmp::Ordering;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Body, Integrator, Obstacle, Staircase};
use crate::schema::WorldConfig;

/// Outcome of an episode.
///
/// `completion_time` is `None` when the ball did not reach the goal within
/// the budget. `progress` is the fraction of the start-to-goal distance
/// covered, 1.0 for completed runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    /// Simulated seconds until the goal was touched.
    pub completion_time: Option<f32>,
    /// Horizontal progress toward the goal.
    pub progress: f32,
}

impl Default for Fitness {
    fn default() -> Self {
        Self::unevaluated()
    }
}

impl Fitness {
    /// Fitness of a member that has not been evaluated yet.
    pub fn unevaluated() -> Self {
        Self {
            completion_time: None,
            progress: 0.0,
        }
    }

    pub fn completed(seconds: f32) -> Self {
        Self {
            completion_time: Some(seconds),
            progress: 1.0,
        }
    }

    pub fn incomplete(progress: f32) -> Self {
        Self {
            completion_time: None,
            progress,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.completion_time.is_some()
    }

    /// Total order used for ranking: completed before incomplete, faster
    /// before slower, then higher progress first.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self.completion_time, other.completion_time) {
            (Some(a), Some(b)) => a
                .total_cmp(&b)
                .then_with(|| other.progress.total_cmp(&self.progress)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => other.progress.total_cmp(&self.progress),
        }
    }
}

impl std::fmt::Display for Fitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.completion_time {
            Some(t) => write!(f, "completed in {:.2}s", t),
            None => write!(f, "incomplete, {:.1}% progress", self.progress * 100.0),
        }
    }
}

/// State handed to an observer after every tick.
#[derive(Debug, Clone, Copy)]
pub struct TickFrame<'a> {
    /// 1-based tick index.
    pub tick: u64,
    pub body: &'a Body,
    pub obstacles: &'a [Obstacle],
}

/// Receives per-tick episode state for presentation or recording.
///
/// Observers cannot influence the simulation.
pub trait EpisodeObserver {
    /// Called once with the freshly built staircase.
    fn on_start(&mut self, _staircase: &Staircase) {}

    /// Called after every tick.
    fn on_tick(&mut self, frame: &TickFrame<'_>);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EpisodeObserver for NoopObserver {
    #[inline]
    fn on_tick(&mut self, _frame: &TickFrame<'_>) {}
}

impl<F> EpisodeObserver for F
where
    F: FnMut(&TickFrame<'_>),
{
    fn on_tick(&mut self, frame: &TickFrame<'_>) {
        self(frame)
    }
}

/// Runs single-ball episodes over staircases in a fixed world.
#[derive(Debug, Clone)]
pub struct EpisodeRunner {
    world: WorldConfig,
    integrator: Integrator,
}

impl EpisodeRunner {
    /// Create a runner for `world`.
    pub fn new(world: WorldConfig) -> Self {
        let integrator = Integrator::new(&world);
        Self { world, integrator }
    }

    /// Number of ticks that fit in `time_budget`.
    pub fn budget_ticks(&self, time_budget: Duration) -> u64 {
        (time_budget.as_secs_f64() / self.world.tick_seconds as f64).round() as u64
    }

    /// Evaluate a profile without observation.
    pub fn evaluate(&self, heights: &[f32], goal_height: f32, time_budget: Duration) -> Fitness {
        self.evaluate_observed(heights, goal_height, time_budget, &mut NoopObserver)
    }

    /// Evaluate a profile, reporting every tick to `observer`.
    ///
    /// Each tick advances the body, then checks for goal contact, then for
    /// timeout. The loop is bounded by the tick budget regardless of what
    /// the body does.
    pub fn evaluate_observed<O>(
        &self,
        heights: &[f32],
        goal_height: f32,
        time_budget: Duration,
        observer: &mut O,
    ) -> Fitness
    where
        O: EpisodeObserver + ?Sized,
    {
        let staircase = Staircase::build(heights, goal_height, &self.world);
        observer.on_start(&staircase);

        let mut body = Body::at_start(&self.world);
        let start_x = body.x;
        let goal_x = self.world.goal_x();
        let max_ticks = self.budget_ticks(time_budget);
        let mut max_x = start_x;
        let mut tick: u64 = 0;

        loop {
            tick += 1;
            self.integrator.advance(&mut body, staircase.obstacles());
            max_x = max_x.max(body.x);

            observer.on_tick(&TickFrame {
                tick,
                body: &body,
                obstacles: staircase.obstacles(),
            });

            if body.touches(staircase.goal()) {
                return Fitness::completed(tick as f32 * self.world.tick_seconds);
            }

            if tick > max_ticks {
                return Fitness::incomplete((max_x - start_x) / (goal_x - start_x));
            }
        }
    }
}
