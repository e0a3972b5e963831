//! Static obstacle geometry built from a height profile.

use serde::{Deserialize, Serialize};

use crate::schema::WorldConfig;

/// Axis-aligned rectangle in world coordinates (`y` grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    /// Create an obstacle resting on the ground line.
    #[inline]
    pub fn on_ground(x: f32, width: f32, height: f32, ground_y: f32) -> Self {
        Self {
            x,
            y: ground_y - height,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Closest point on (or inside) the rectangle to `(px, py)`.
    ///
    /// Returns the query point itself when it lies inside the rectangle.
    #[inline]
    pub fn closest_point(&self, px: f32, py: f32) -> (f32, f32) {
        (
            px.min(self.right()).max(self.left()),
            py.min(self.bottom()).max(self.top()),
        )
    }

    /// Euclidean distance from `(px, py)` to the rectangle (0 inside).
    #[inline]
    pub fn distance_to(&self, px: f32, py: f32) -> f32 {
        let (cx, cy) = self.closest_point(px, py);
        let dx = px - cx;
        let dy = py - cy;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Obstacle set for one episode: one obstacle per step, goal last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staircase {
    obstacles: Vec<Obstacle>,
}

impl Staircase {
    /// Build the staircase for `heights` with a goal of `goal_height`.
    ///
    /// Step `i` spans `[start_x + i * step_width, .. + step_width + overlap]`.
    /// The goal sits `goal_offset` past the end of the last step and carries
    /// no overlap.
    pub fn build(heights: &[f32], goal_height: f32, world: &WorldConfig) -> Self {
        let step_width = world.step_width();
        let mut obstacles = Vec::with_capacity(heights.len() + 1);

        for (i, &height) in heights.iter().enumerate() {
            obstacles.push(Obstacle::on_ground(
                world.staircase_start_x + i as f32 * step_width,
                step_width + world.step_overlap,
                height,
                world.ground_y,
            ));
        }

        obstacles.push(Obstacle::on_ground(
            world.goal_x(),
            step_width,
            goal_height,
            world.ground_y,
        ));

        Self { obstacles }
    }

    /// All obstacles in collision order, goal included.
    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Step obstacles only.
    #[inline]
    pub fn steps(&self) -> &[Obstacle] {
        &self.obstacles[..self.obstacles.len() - 1]
    }

    /// The goal obstacle.
    #[inline]
    pub fn goal(&self) -> &Obstacle {
        // `build` always pushes the goal.
        &self.obstacles[self.obstacles.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_outside() {
        let rect = Obstacle {
            x: 10.0,
            y: 10.0,
            width: 5.0,
            height: 5.0,
        };
        assert_eq!(rect.closest_point(0.0, 12.0), (10.0, 12.0));
        assert_eq!(rect.closest_point(20.0, 20.0), (15.0, 15.0));
        assert!((rect.distance_to(18.0, 19.0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_inside_is_zero() {
        let rect = Obstacle {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert_eq!(rect.closest_point(3.0, 4.0), (3.0, 4.0));
        assert_eq!(rect.distance_to(3.0, 4.0), 0.0);
    }

    #[test]
    fn test_staircase_layout() {
        let world = WorldConfig {
            steps: 4,
            ..Default::default()
        };
        let heights = [100.0, 80.0, 60.0, 40.0];
        let stairs = Staircase::build(&heights, 70.0, &world);
        let step_width = world.step_width();

        assert_eq!(stairs.obstacles().len(), 5);
        assert_eq!(stairs.steps().len(), 4);

        for (i, step) in stairs.steps().iter().enumerate() {
            assert!((step.x - (50.0 + i as f32 * step_width)).abs() < 1e-3);
            assert_eq!(step.height, heights[i]);
            assert_eq!(step.bottom(), world.ground_y);
            assert!((step.width - (step_width + 1.0)).abs() < 1e-5);
        }

        let goal = stairs.goal();
        assert!((goal.x - world.goal_x()).abs() < 1e-3);
        assert_eq!(goal.top(), world.ground_y - 70.0);
        assert!((goal.width - step_width).abs() < 1e-5);
    }
}
