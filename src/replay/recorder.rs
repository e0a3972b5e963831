//! Replay recorder for capturing episode frames.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compute::{EpisodeObserver, EpisodeRunner, Fitness, Obstacle, Staircase, TickFrame};

/// Configuration for replay recording.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Record every Nth tick (1 = every tick).
    pub frame_skip: u32,
    /// Maximum frames to record (0 = unlimited).
    pub max_frames: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            frame_skip: 1,
            max_frames: 0,
        }
    }
}

/// Ball state at one recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// A recorded episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Ball radius.
    pub radius: f32,
    /// Obstacles in collision order, goal last.
    pub obstacles: Vec<Obstacle>,
    /// Recorded frames in tick order.
    pub frames: Vec<ReplayFrame>,
    /// Outcome of the episode.
    pub fitness: Fitness,
}

impl Replay {
    /// Write the replay as pretty JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()
    }

    /// Read a replay written by [`Replay::save_json`].
    pub fn load_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl std::fmt::Display for Replay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, {} obstacles, {}",
            self.frames.len(),
            self.obstacles.len(),
            self.fitness
        )
    }
}

/// Observer that captures frames of an episode.
///
/// Usage:
/// ```ignore
/// let mut recorder = ReplayRecorder::new(RecorderConfig::default());
/// let fitness = runner.evaluate_observed(&heights, goal, budget, &mut recorder);
/// let replay = recorder.finish(fitness);
/// replay.save_json("best.json")?;
/// ```
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    config: RecorderConfig,
    radius: f32,
    obstacles: Vec<Obstacle>,
    frames: Vec<ReplayFrame>,
    step_counter: u32,
}

impl ReplayRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Package the recorded frames with the episode outcome.
    pub fn finish(self, fitness: Fitness) -> Replay {
        Replay {
            radius: self.radius,
            obstacles: self.obstacles,
            frames: self.frames,
            fitness,
        }
    }
}

impl EpisodeObserver for ReplayRecorder {
    fn on_start(&mut self, staircase: &Staircase) {
        self.obstacles = staircase.obstacles().to_vec();
        self.frames.clear();
        self.step_counter = 0;
    }

    fn on_tick(&mut self, frame: &TickFrame<'_>) {
        self.radius = frame.body.radius;
        self.step_counter += 1;

        if self.step_counter < self.config.frame_skip {
            return;
        }
        self.step_counter = 0;

        if self.config.max_frames > 0 && self.frames.len() as u64 >= self.config.max_frames {
            return;
        }

        self.frames.push(ReplayFrame {
            tick: frame.tick,
            x: frame.body.x,
            y: frame.body.y,
            vx: frame.body.vx,
            vy: frame.body.vy,
        });
    }
}

/// Run one episode and record it.
pub fn record_episode(
    runner: &EpisodeRunner,
    heights: &[f32],
    goal_height: f32,
    time_budget: Duration,
    config: RecorderConfig,
) -> Replay {
    let mut recorder = ReplayRecorder::new(config);
    let fitness = runner.evaluate_observed(heights, goal_height, time_budget, &mut recorder);
    recorder.finish(fitness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::WorldConfig;
    use tempfile::tempdir;

    fn tall_wall() -> (EpisodeRunner, Vec<f32>) {
        let world = WorldConfig::default();
        let heights = vec![500.0; world.steps];
        (EpisodeRunner::new(world), heights)
    }

    #[test]
    fn test_recorder_basic() {
        let (runner, heights) = tall_wall();
        // 10 ticks of budget, timeout after the 11th.
        let replay = record_episode(
            &runner,
            &heights,
            50.0,
            Duration::from_millis(50),
            RecorderConfig::default(),
        );

        assert_eq!(replay.frames.len(), 11);
        assert_eq!(replay.obstacles.len(), heights.len() + 1);
        assert_eq!(replay.radius, 20.0);
        assert!(!replay.fitness.is_complete());
        let ticks: Vec<u64> = replay.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, (1..=11).collect::<Vec<_>>());
    }

    #[test]
    fn test_recorder_frame_skip() {
        let (runner, heights) = tall_wall();
        let config = RecorderConfig {
            frame_skip: 5,
            ..Default::default()
        };

        // 20-tick budget runs 21 ticks: frames at ticks 5, 10, 15, 20.
        let replay = record_episode(&runner, &heights, 50.0, Duration::from_millis(100), config);
        let ticks: Vec<u64> = replay.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![5, 10, 15, 20]);
    }

    #[test]
    fn test_recorder_max_frames() {
        let (runner, heights) = tall_wall();
        let config = RecorderConfig {
            max_frames: 5,
            ..Default::default()
        };

        let replay = record_episode(&runner, &heights, 50.0, Duration::from_millis(500), config);
        assert_eq!(replay.frames.len(), 5);
    }

    #[test]
    fn test_recording_matches_unobserved_fitness() {
        let (runner, heights) = tall_wall();
        let budget = Duration::from_millis(300);

        let replay = record_episode(&runner, &heights, 50.0, budget, RecorderConfig::default());
        assert_eq!(replay.fitness, runner.evaluate(&heights, 50.0, budget));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.json");
        let (runner, heights) = tall_wall();

        let replay = record_episode(
            &runner,
            &heights,
            50.0,
            Duration::from_millis(100),
            RecorderConfig::default(),
        );
        replay.save_json(&path).unwrap();

        let loaded = Replay::load_json(&path).unwrap();
        assert_eq!(loaded.frames, replay.frames);
        assert_eq!(loaded.obstacles, replay.obstacles);
        assert_eq!(loaded.fitness, replay.fitness);
    }
}
