//! Episode recording for offline playback.
//!
//! A [`ReplayRecorder`] is an [`EpisodeObserver`](crate::compute::EpisodeObserver)
//! that captures the ball state every N ticks. The finished [`Replay`]
//! carries the obstacle layout, the frames and the episode outcome, and is
//! stored as JSON:
//!
//! ```text
//! {
//!   "radius": 20.0,
//!   "obstacles": [{ "x": .., "y": .., "width": .., "height": .. }, ...],
//!   "frames": [{ "tick": 1, "x": .., "y": .., "vx": .., "vy": .. }, ...],
//!   "fitness": { "completion_time": 0.74, "progress": 1.0 }
//! }
//! ```

mod recorder;

pub use recorder::{RecorderConfig, Replay, ReplayFrame, ReplayRecorder, record_episode};
