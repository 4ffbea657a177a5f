//! Ball motion control for a putting game.
//!
//! [`controller::BallMotionController`] turns the per-tick output of a
//! physics integrator into `Putt`, `Rest`, `Hole` and `OutOfBounds` events.
//! The remaining modules supply a reference integrator, courses and a level
//! session that consumes those events.

pub mod config;
pub mod controller;
pub mod course;
pub mod physics;
pub mod scoring;
pub mod session;

pub use config::BallConfig;
pub use controller::{BallMotionController, ControllerSnapshot, MotionState};
pub use session::{LevelSession, PuttRejected, SessionOutcome};
