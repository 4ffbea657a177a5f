use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Capabilities a ball controller needs from the physics integrator.
///
/// The integrator owns position/velocity integration and collision
/// resolution. Implementations must skip integration while frozen.
pub trait BallBody: Send {
    /// Include or exclude the body from integration.
    fn set_frozen(&mut self, frozen: bool);

    /// Apply an instantaneous change in linear velocity.
    fn apply_velocity_change(&mut self, delta: Vec3);

    fn linear_velocity(&self) -> Vec3;

    fn angular_velocity(&self) -> Vec3;

    fn set_angular_velocity(&mut self, angular_velocity: Vec3);
}

/// Trigger region categories reported by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Goal trigger at the end of a level.
    LevelEnd,
    /// Playable area. Leaving every bounds region means out of bounds.
    LevelBounds,
    /// Any other tagged trigger. Ignored by the ball controller.
    Other,
}

/// A contact notification for the current tick.
///
/// Stay contacts fire once per tick per overlapping region while the
/// overlap persists. Enter contacts fire once on first overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    /// Sustained contact with a rollable surface.
    SurfaceStay,
    TriggerEnter(Region),
    TriggerStay(Region),
}
