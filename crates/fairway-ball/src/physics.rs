use serde::{Deserialize, Serialize};

use fairway_core::body::{BallBody, Contact, Region};
use fairway_core::math::Vec3;

use crate::course::{Course, Wall};

/// Ball radius in world units.
pub const BALL_RADIUS: f32 = 0.3;
/// Fraction of rolling speed kept after one second on the green.
pub const ROLLING_DECAY_PER_SEC: f32 = 0.5;
/// Below this horizontal speed a rolling ball snaps to a stop.
pub const STOP_SPEED: f32 = 0.02;
/// A ball slower than this over the cup drops in.
pub const CUP_CAPTURE_SPEED: f32 = 4.0;
/// Vertical acceleration once the ball leaves the green.
pub const GRAVITY: f32 = -9.81;
/// Fall speed cap.
const TERMINAL_VELOCITY: f32 = 30.0;
/// Speed kept on a wall bounce.
const WALL_RESTITUTION: f32 = 0.9;
/// Physics substeps per tick for more accurate wall collisions.
const SUBSTEPS: u32 = 4;

/// Minimal XZ-plane ball integrator implementing [`BallBody`].
///
/// Rolls with exponential friction, reflects off walls, falls once it leaves
/// every bounds region and drops into the cup when slow enough. Each
/// [`step`](Self::step) reports the contacts a rigid-body engine would.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub frozen: bool,
    /// Captured by the cup. Cleared by the next velocity change.
    pub cupped: bool,
    in_goal: bool,
    in_bounds: Vec<bool>,
}

impl SimpleBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            frozen: false,
            cupped: false,
            in_goal: false,
            in_bounds: Vec::new(),
        }
    }

    /// Move the ball to `position` with no motion. Trigger overlaps are
    /// forgotten so the next step reports fresh enter contacts.
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.cupped = false;
        self.in_goal = false;
        self.in_bounds.clear();
    }

    /// Whether the ball is resting on the green surface.
    pub fn is_grounded(&self, course: &Course) -> bool {
        !self.cupped && self.position.y <= 0.0 && course.in_bounds(self.position)
    }

    /// Advance by `dt` seconds and return this tick's contacts.
    ///
    /// Frozen bodies do not move and report no surface contact, but still
    /// report the triggers they overlap.
    pub fn step(&mut self, course: &Course, dt: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();

        if !self.frozen {
            self.integrate(course, dt);
            if self.is_grounded(course) || self.cupped {
                contacts.push(Contact::SurfaceStay);
            }
        }

        self.collect_triggers(course, &mut contacts);
        contacts
    }

    fn integrate(&mut self, course: &Course, dt: f32) {
        if self.cupped {
            return;
        }

        let sub_dt = dt / SUBSTEPS as f32;
        for _ in 0..SUBSTEPS {
            let on_green = course.in_bounds(self.position) && self.position.y >= 0.0;
            if !on_green {
                self.velocity.y = (self.velocity.y + GRAVITY * sub_dt).max(-TERMINAL_VELOCITY);
            }

            self.position += self.velocity * sub_dt;

            if self.position.y > -BALL_RADIUS {
                for wall in &course.walls {
                    self.collide_wall(wall);
                }
            }

            if course.in_goal(self.position) && self.horizontal_speed() < CUP_CAPTURE_SPEED {
                self.cupped = true;
                self.velocity = Vec3::ZERO;
                self.position = Vec3::new(
                    course.hole_position.x,
                    -BALL_RADIUS,
                    course.hole_position.z,
                );
                return;
            }
        }

        if self.position.y >= 0.0 && course.in_bounds(self.position) {
            // Rolling friction on the green
            let keep = ROLLING_DECAY_PER_SEC.powf(dt);
            self.velocity.x *= keep;
            self.velocity.z *= keep;
            if self.horizontal_speed() < STOP_SPEED {
                self.velocity.x = 0.0;
                self.velocity.z = 0.0;
            }
        }
    }

    fn collect_triggers(&mut self, course: &Course, contacts: &mut Vec<Contact>) {
        // The goal trigger sits inside the cup, below the green surface.
        let in_goal = course.in_goal(self.position)
            && self.position.y < 0.0
            && self.position.y >= -BALL_RADIUS;
        if in_goal {
            if !self.in_goal {
                contacts.push(Contact::TriggerEnter(Region::LevelEnd));
            }
            contacts.push(Contact::TriggerStay(Region::LevelEnd));
        }
        self.in_goal = in_goal;

        self.in_bounds.resize(course.bounds.len(), false);
        for (region, was_inside) in course.bounds.iter().zip(self.in_bounds.iter_mut()) {
            let inside = region.contains(self.position);
            if inside {
                if !*was_inside {
                    contacts.push(Contact::TriggerEnter(Region::LevelBounds));
                }
                contacts.push(Contact::TriggerStay(Region::LevelBounds));
            }
            *was_inside = inside;
        }
    }

    fn horizontal_speed(&self) -> f32 {
        (self.velocity.x * self.velocity.x + self.velocity.z * self.velocity.z).sqrt()
    }

    fn collide_wall(&mut self, wall: &Wall) {
        // 2D line-segment collision on XZ plane
        let ax = wall.a.x;
        let az = wall.a.z;
        let dx = wall.b.x - ax;
        let dz = wall.b.z - az;
        let len_sq = dx * dx + dz * dz;
        if len_sq < 1e-6 {
            return;
        }

        // Project ball center onto wall segment
        let t = (((self.position.x - ax) * dx + (self.position.z - az) * dz) / len_sq).clamp(0.0, 1.0);
        let nx = self.position.x - (ax + t * dx);
        let nz = self.position.z - (az + t * dz);
        let dist = (nx * nx + nz * nz).sqrt();

        if dist < BALL_RADIUS && dist > 1e-6 {
            let normal = Vec3::new(nx / dist, 0.0, nz / dist);

            // Push out
            self.position += normal * (BALL_RADIUS - dist);

            // Reflect horizontal velocity with slight energy loss
            let dot = self.velocity.dot(normal);
            if dot < 0.0 {
                let fall = self.velocity.y;
                self.velocity = (self.velocity - normal * (2.0 * dot)) * WALL_RESTITUTION;
                self.velocity.y = fall;
            }
        }
    }
}

impl BallBody for SimpleBody {
    /// A frozen body carries no momentum.
    fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        if frozen {
            self.velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
    }

    /// Adds the velocity change plus the matching rolling spin.
    fn apply_velocity_change(&mut self, delta: Vec3) {
        if self.cupped {
            self.cupped = false;
            self.position.y = 0.0;
        }
        self.velocity += delta;
        // Rolling without slipping: omega = up x v / r
        self.angular_velocity += Vec3::new(delta.z, 0.0, -delta.x) * (1.0 / BALL_RADIUS);
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{cliff_edge, practice_green};

    const DT: f32 = 1.0 / 50.0;

    fn bounds_stays(contacts: &[Contact]) -> usize {
        contacts
            .iter()
            .filter(|c| **c == Contact::TriggerStay(Region::LevelBounds))
            .count()
    }

    #[test]
    fn ball_stops_with_friction() {
        let course = practice_green();
        let mut ball = SimpleBody::new(Vec3::new(6.0, 0.0, 5.0));
        ball.apply_velocity_change(Vec3::new(0.0, 0.0, 3.0));

        for _ in 0..2_000 {
            ball.step(&course, DT);
        }

        assert_eq!(ball.velocity, Vec3::ZERO, "ball should have stopped");
    }

    #[test]
    fn ball_reflects_off_wall() {
        let course = practice_green();
        let mut ball = SimpleBody::new(Vec3::new(BALL_RADIUS + 0.05, 0.0, 5.0));
        ball.velocity = Vec3::new(-5.0, 0.0, 0.0);

        ball.step(&course, DT);

        assert!(ball.velocity.x > 0.0, "vx = {}", ball.velocity.x);
        assert!(ball.position.x >= BALL_RADIUS - 1e-4);
    }

    #[test]
    fn first_tick_in_a_region_reports_enter_and_stay() {
        let course = practice_green();
        let mut ball = SimpleBody::new(course.spawn_point);

        let first = ball.step(&course, DT);
        assert!(first.contains(&Contact::TriggerEnter(Region::LevelBounds)));
        assert_eq!(bounds_stays(&first), 1);

        let second = ball.step(&course, DT);
        assert!(!second.contains(&Contact::TriggerEnter(Region::LevelBounds)));
        assert_eq!(bounds_stays(&second), 1);
    }

    #[test]
    fn rolling_ball_reports_surface_contact() {
        let course = practice_green();
        let mut ball = SimpleBody::new(course.spawn_point);
        ball.apply_velocity_change(Vec3::new(0.0, 0.0, 2.0));
        assert!(ball.step(&course, DT).contains(&Contact::SurfaceStay));
    }

    #[test]
    fn frozen_body_holds_still_but_reports_triggers() {
        let course = practice_green();
        let mut ball = SimpleBody::new(course.spawn_point);
        ball.apply_velocity_change(Vec3::new(0.0, 0.0, 2.0));
        ball.set_frozen(true);

        let contacts = ball.step(&course, DT);

        assert_eq!(ball.position, course.spawn_point);
        assert_eq!(ball.velocity, Vec3::ZERO);
        assert!(!contacts.contains(&Contact::SurfaceStay));
        assert_eq!(bounds_stays(&contacts), 1);
    }

    #[test]
    fn ball_rolls_off_open_edge_and_leaves_bounds() {
        let course = cliff_edge();
        let mut ball = SimpleBody::new(Vec3::new(12.0, 0.0, 10.0));
        ball.apply_velocity_change(Vec3::new(6.0, 0.0, 0.0));

        let mut last = ball.step(&course, DT);
        for _ in 1..50 {
            last = ball.step(&course, DT);
        }

        assert!(ball.position.x > 14.0);
        assert!(ball.position.y < 0.0, "ball should be falling");
        assert_eq!(bounds_stays(&last), 0);
        assert!(!last.contains(&Contact::SurfaceStay));
    }

    #[test]
    fn slow_ball_drops_into_cup() {
        let course = practice_green();
        let start = course.hole_position - Vec3::new(0.0, 0.0, 1.0);
        let mut ball = SimpleBody::new(start);
        ball.apply_velocity_change(Vec3::new(0.0, 0.0, 2.0));

        let mut enters = 0;
        for _ in 0..100 {
            let contacts = ball.step(&course, DT);
            enters += contacts
                .iter()
                .filter(|c| **c == Contact::TriggerEnter(Region::LevelEnd))
                .count();
        }

        assert!(ball.cupped);
        assert_eq!(ball.velocity, Vec3::ZERO);
        assert_eq!(enters, 1);
    }

    #[test]
    fn fast_ball_rolls_over_the_cup() {
        let course = practice_green();
        let start = course.hole_position - Vec3::new(0.0, 0.0, 2.0);
        let mut ball = SimpleBody::new(start);
        ball.apply_velocity_change(Vec3::new(0.0, 0.0, 20.0));

        for _ in 0..5 {
            let contacts = ball.step(&course, DT);
            assert!(!contacts.contains(&Contact::TriggerEnter(Region::LevelEnd)));
        }

        assert!(!ball.cupped);
    }

    #[test]
    fn launch_from_cup_lifts_ball_out() {
        let mut ball = SimpleBody::new(Vec3::ZERO);
        ball.cupped = true;
        ball.position.y = -BALL_RADIUS;
        ball.apply_velocity_change(Vec3::new(1.0, 0.0, 0.0));
        assert!(!ball.cupped);
        assert_eq!(ball.position.y, 0.0);
    }

    #[test]
    fn velocity_change_adds_rolling_spin() {
        let mut ball = SimpleBody::new(Vec3::ZERO);
        ball.apply_velocity_change(Vec3::new(0.0, 0.0, 3.0));
        assert!((ball.angular_velocity.x - 3.0 / BALL_RADIUS).abs() < 1e-4);
        assert_eq!(ball.angular_velocity.z, 0.0);
    }

    #[test]
    fn teleport_clears_motion_and_overlaps() {
        let course = practice_green();
        let mut ball = SimpleBody::new(course.spawn_point);
        ball.step(&course, DT);
        ball.velocity = Vec3::new(1.0, 0.0, 1.0);

        ball.teleport(course.spawn_point);

        assert_eq!(ball.velocity, Vec3::ZERO);
        assert!(
            ball.step(&course, DT)
                .contains(&Contact::TriggerEnter(Region::LevelBounds))
        );
    }
}
