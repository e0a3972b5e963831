//! Configuration types for the staircase world and ball physics.

use serde::{Deserialize, Serialize};

/// Geometry and physics constants for a single episode.
///
/// Coordinates follow screen convention: `x` grows to the right, `y` grows
/// downward, and the ground is the horizontal line `y = ground_y`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width. Together with the start and end gap it fixes the step width.
    #[serde(default = "default_width")]
    pub width: f32,
    /// Y coordinate of the ground line.
    #[serde(default = "default_ground_y")]
    pub ground_y: f32,
    /// Per-tick increment added to vertical velocity.
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Restitution applied on every ground and obstacle contact.
    #[serde(default = "default_bounce_factor")]
    pub bounce_factor: f32,
    /// Number of staircase steps (profile length).
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// X coordinate of the first step's left edge.
    #[serde(default = "default_staircase_start_x")]
    pub staircase_start_x: f32,
    /// Space reserved after the staircase for the gap and goal.
    #[serde(default = "default_staircase_end_gap")]
    pub staircase_end_gap: f32,
    /// Horizontal distance from the end of the last step to the goal.
    #[serde(default = "default_goal_offset")]
    pub goal_offset: f32,
    /// Extra width added to each step so neighbours overlap.
    #[serde(default = "default_step_overlap")]
    pub step_overlap: f32,
    /// Ball radius.
    #[serde(default = "default_ball_radius")]
    pub ball_radius: f32,
    /// Ball position at the start of every episode.
    #[serde(default = "default_ball_start")]
    pub ball_start: (f32, f32),
    /// Simulated seconds per tick.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            ground_y: default_ground_y(),
            gravity: default_gravity(),
            bounce_factor: default_bounce_factor(),
            steps: default_steps(),
            staircase_start_x: default_staircase_start_x(),
            staircase_end_gap: default_staircase_end_gap(),
            goal_offset: default_goal_offset(),
            step_overlap: default_step_overlap(),
            ball_radius: default_ball_radius(),
            ball_start: default_ball_start(),
            tick_seconds: default_tick_seconds(),
        }
    }
}

fn default_width() -> f32 {
    1500.0
}
fn default_ground_y() -> f32 {
    600.0
}
fn default_gravity() -> f32 {
    0.8
}
fn default_bounce_factor() -> f32 {
    0.5
}
fn default_steps() -> usize {
    200
}
fn default_staircase_start_x() -> f32 {
    50.0
}
fn default_staircase_end_gap() -> f32 {
    150.0
}
fn default_goal_offset() -> f32 {
    100.0
}
fn default_step_overlap() -> f32 {
    1.0
}
fn default_ball_radius() -> f32 {
    20.0
}
fn default_ball_start() -> (f32, f32) {
    (100.0, 50.0)
}
fn default_tick_seconds() -> f32 {
    1.0 / 200.0
}

impl WorldConfig {
    /// Width usable by the staircase.
    #[inline]
    pub fn usable_width(&self) -> f32 {
        self.width - self.staircase_start_x - self.staircase_end_gap
    }

    /// Width of a single step.
    #[inline]
    pub fn step_width(&self) -> f32 {
        self.usable_width() / self.steps as f32
    }

    /// X coordinate of the goal obstacle's left edge.
    #[inline]
    pub fn goal_x(&self) -> f32 {
        self.staircase_start_x + self.steps as f32 * self.step_width() + self.goal_offset
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::NoSteps);
        }
        if self.usable_width() <= 0.0 {
            return Err(ConfigError::InvalidWidth {
                width: self.width,
                reserved: self.staircase_start_x + self.staircase_end_gap,
            });
        }
        if self.ball_radius <= 0.0 {
            return Err(ConfigError::InvalidRadius);
        }
        if !(0.0..=1.0).contains(&self.bounce_factor) {
            return Err(ConfigError::InvalidBounceFactor(self.bounce_factor));
        }
        if self.tick_seconds <= 0.0 {
            return Err(ConfigError::InvalidTick);
        }
        if self.goal_x() <= self.ball_start.0 {
            return Err(ConfigError::GoalBehindStart);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Staircase must have at least one step")]
    NoSteps,
    #[error("World width {width} leaves no room for steps ({reserved} reserved)")]
    InvalidWidth { width: f32, reserved: f32 },
    #[error("Ball radius must be positive")]
    InvalidRadius,
    #[error("Bounce factor {0} must lie in [0, 1]")]
    InvalidBounceFactor(f32),
    #[error("Tick duration must be positive")]
    InvalidTick,
    #[error("Goal must lie to the right of the ball start position")]
    GoalBehindStart,
}
