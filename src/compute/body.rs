//! Single circular body and its fixed-step integrator.
//!
//! Each tick applies gravity, integrates position, bounces off the ground
//! and then resolves every overlapping obstacle in order. There is no
//! sub-stepping, so fast bodies can tunnel through thin geometry.

use serde::{Deserialize, Serialize};

use super::Obstacle;
use crate::schema::WorldConfig;

/// Normal used when the body center lies inside an obstacle.
pub const DEGENERATE_NORMAL: (f32, f32) = (0.0, -1.0);

/// Kinematic state of the ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

impl Body {
    /// Body at rest at the world's start position.
    pub fn at_start(world: &WorldConfig) -> Self {
        Self {
            x: world.ball_start.0,
            y: world.ball_start.1,
            vx: 0.0,
            vy: 0.0,
            radius: world.ball_radius,
        }
    }

    /// Distance from the body center to the obstacle.
    #[inline]
    pub fn distance_to(&self, obstacle: &Obstacle) -> f32 {
        obstacle.distance_to(self.x, self.y)
    }

    /// Whether the body surface touches the obstacle.
    #[inline]
    pub fn touches(&self, obstacle: &Obstacle) -> bool {
        self.distance_to(obstacle) <= self.radius
    }
}

/// Contact produced by a circle/rectangle overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the obstacle toward the body center.
    pub normal: (f32, f32),
    /// Overlap depth along the normal.
    pub penetration: f32,
}

/// Test the body against an obstacle using the closest-point method.
///
/// Returns `None` when the distance to the obstacle is at least the radius.
pub fn contact(body: &Body, obstacle: &Obstacle) -> Option<Contact> {
    let (cx, cy) = obstacle.closest_point(body.x, body.y);
    let dx = body.x - cx;
    let dy = body.y - cy;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance >= body.radius {
        return None;
    }

    let normal = if distance > 0.0 {
        (dx / distance, dy / distance)
    } else {
        DEGENERATE_NORMAL
    };

    Some(Contact {
        normal,
        penetration: body.radius - distance,
    })
}

/// Push the body out of a contact and reflect its velocity.
///
/// The whole reflection term is scaled by `bounce_factor`:
/// `v' = v - 2 (v . n) n * bounce_factor`. The tangential component is
/// left untouched.
#[inline]
pub fn resolve(body: &mut Body, contact: &Contact, bounce_factor: f32) {
    let (nx, ny) = contact.normal;

    body.x += nx * contact.penetration;
    body.y += ny * contact.penetration;

    let dot = body.vx * nx + body.vy * ny;
    body.vx += -2.0 * dot * nx * bounce_factor;
    body.vy += -2.0 * dot * ny * bounce_factor;
}

/// Fixed-step integrator for a body among static obstacles.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    gravity: f32,
    bounce_factor: f32,
    ground_y: f32,
}

impl Integrator {
    pub fn new(world: &WorldConfig) -> Self {
        Self {
            gravity: world.gravity,
            bounce_factor: world.bounce_factor,
            ground_y: world.ground_y,
        }
    }

    /// Advance the body by one tick.
    ///
    /// Obstacles are resolved independently in slice order; a body touching
    /// two obstacles in the same tick is corrected twice.
    pub fn advance(&self, body: &mut Body, obstacles: &[Obstacle]) {
        body.vy += self.gravity;

        body.x += body.vx;
        body.y += body.vy;

        if body.y + body.radius > self.ground_y {
            body.y = self.ground_y - body.radius;
            body.vy *= -self.bounce_factor;
        }

        for obstacle in obstacles {
            if let Some(contact) = contact(body, obstacle) {
                resolve(body, &contact, self.bounce_factor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f32, y: f32, vx: f32, vy: f32) -> Body {
        Body {
            x,
            y,
            vx,
            vy,
            radius: 20.0,
        }
    }

    fn block(x: f32, y: f32, width: f32, height: f32) -> Obstacle {
        Obstacle {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_free_fall_applies_gravity_first() {
        let integrator = Integrator::new(&WorldConfig::default());
        let mut body = body_at(100.0, 50.0, 0.0, 0.0);

        integrator.advance(&mut body, &[]);
        assert!((body.vy - 0.8).abs() < 1e-6);
        assert!((body.y - 50.8).abs() < 1e-5);

        integrator.advance(&mut body, &[]);
        assert!((body.vy - 1.6).abs() < 1e-6);
        assert!((body.y - 52.4).abs() < 1e-5);
    }

    #[test]
    fn test_ground_bounce() {
        let world = WorldConfig::default();
        let integrator = Integrator::new(&world);
        // Arrives at the ground with vy = 10 after gravity.
        let mut body = body_at(100.0, 575.0, 3.0, 9.2);

        integrator.advance(&mut body, &[]);

        assert_eq!(body.y, world.ground_y - body.radius);
        assert!((body.vy - (-0.5 * 10.0)).abs() < 1e-5);
        assert_eq!(body.vx, 3.0);
    }

    #[test]
    fn test_center_inside_uses_upward_normal() {
        let body = body_at(5.0, 5.0, 0.0, 0.0);
        let obstacle = block(0.0, 0.0, 10.0, 10.0);

        assert_eq!(obstacle.distance_to(body.x, body.y), 0.0);
        let contact = contact(&body, &obstacle).unwrap();
        assert_eq!(contact.normal, (0.0, -1.0));
        assert_eq!(contact.penetration, body.radius);
    }

    #[test]
    fn test_no_contact_at_exact_radius() {
        let body = body_at(5.0, -20.0, 0.0, 0.0);
        let obstacle = block(0.0, 0.0, 10.0, 10.0);
        assert!(contact(&body, &obstacle).is_none());
    }

    #[test]
    fn test_landing_on_top_face() {
        let body = body_at(5.0, -15.0, 2.0, 4.0);
        let obstacle = block(0.0, 0.0, 10.0, 10.0);

        let c = contact(&body, &obstacle).unwrap();
        assert_eq!(c.normal, (0.0, -1.0));
        assert!((c.penetration - 5.0).abs() < 1e-6);

        let mut resolved = body;
        resolve(&mut resolved, &c, 0.5);
        assert!((resolved.y - (-20.0)).abs() < 1e-6);
        // v . n = -4, so vy' = 4 - 2 * (-4) * (-1) * 0.5 = 0
        assert!(resolved.vy.abs() < 1e-6);
        assert_eq!(resolved.vx, 2.0);
    }

    #[test]
    fn test_corner_contact_pushes_diagonally() {
        // Center up-left of the (0, 0) corner at distance 10.
        let d = 10.0 / 2f32.sqrt();
        let body = body_at(-d, -d, 1.0, 1.0);
        let obstacle = block(0.0, 0.0, 10.0, 10.0);

        let c = contact(&body, &obstacle).unwrap();
        assert!((c.normal.0 + 1.0 / 2f32.sqrt()).abs() < 1e-5);
        assert!((c.normal.1 + 1.0 / 2f32.sqrt()).abs() < 1e-5);
        assert!((c.penetration - 10.0).abs() < 1e-4);

        let mut resolved = body;
        resolve(&mut resolved, &c, 0.5);
        assert!((resolved.distance_to(&obstacle) - 20.0).abs() < 1e-3);
        // Head-on into the corner with bounce 0.5 cancels the velocity.
        assert!(resolved.vx.abs() < 1e-5);
        assert!(resolved.vy.abs() < 1e-5);
    }

    #[test]
    fn test_overlapping_obstacles_each_resolved() {
        let world = WorldConfig {
            gravity: 0.0,
            ..Default::default()
        };
        let integrator = Integrator::new(&world);
        let stacked = [block(0.0, 0.0, 10.0, 10.0), block(0.0, 0.0, 10.0, 10.0)];
        let mut body = body_at(5.0, -15.0, 0.0, 0.0);

        integrator.advance(&mut body, &stacked);

        // First obstacle pushes the body clear, second no longer overlaps.
        assert!((body.y - (-20.0)).abs() < 1e-5);

        let mut deep = body_at(5.0, 5.0, 0.0, 0.0);
        integrator.advance(&mut deep, &stacked);
        // Center inside: first correction lifts by the radius to y = -15,
        // which still overlaps the second copy by 5.
        assert!((deep.y - (-20.0)).abs() < 1e-5);
    }
}
