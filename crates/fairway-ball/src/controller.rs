use serde::{Deserialize, Serialize};

use fairway_core::body::{BallBody, Contact, Region};
use fairway_core::events::{BallEvent, BallEventKind, BallId, EventDispatcher, SubscriptionId};
use fairway_core::math::Vec3;

use crate::config::BallConfig;

/// Coarse motion state of a ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    /// Frozen and committed to rest.
    Resting,
    /// Live in the integrator.
    Moving,
}

/// Flags and timers of a controller, without its body or listeners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub is_frozen: bool,
    pub is_at_rest: bool,
    pub last_launch_time: f64,
    pub last_moving_time: f64,
    pub is_touching_bounds: bool,
}

impl ControllerSnapshot {
    /// Encode as MessagePack.
    pub fn to_bytes(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

/// Reduce the magnitude of `angular_velocity` by `damping * dt`, keeping
/// its direction and stopping at zero.
pub fn damp_angular_velocity(angular_velocity: Vec3, damping: f32, dt: f32) -> Vec3 {
    let speed = angular_velocity.length();
    if speed <= 0.0 {
        return angular_velocity;
    }
    let drop = (damping * dt).min(speed);
    // Scaling by a non-negative factor cannot flip any component's sign.
    angular_velocity * ((speed - drop) / speed)
}

/// Turns an integrator's per-tick output into discrete ball events.
///
/// Drive it once per fixed tick in this order: [`fixed_update`], then the
/// integrator step, then [`handle_contact`] for each contact the step
/// reported. [`launch`] may be called between ticks. All mutation goes
/// through `&mut self`, so hosts that accept input on another thread must
/// serialize it with the tick themselves.
///
/// Repeated `Hole` and per-tick `OutOfBounds` emissions are part of the
/// contract. Listeners must deduplicate.
///
/// [`fixed_update`]: Self::fixed_update
/// [`handle_contact`]: Self::handle_contact
/// [`launch`]: Self::launch
pub struct BallMotionController<B: BallBody> {
    ball_id: BallId,
    body: B,
    angular_damping: f32,
    velocity_epsilon: f32,
    rest_delay: f64,
    launch_grace: f64,
    start_at_rest: bool,
    is_frozen: bool,
    is_at_rest: bool,
    last_launch_time: f64,
    last_moving_time: f64,
    is_touching_bounds: bool,
    ticks_out_of_bounds: u32,
    events: EventDispatcher,
}

impl<B: BallBody> BallMotionController<B> {
    /// Create a controller for a freshly loaded level at time `now`.
    pub fn new(ball_id: BallId, body: B, config: &BallConfig, now: f64) -> Self {
        let mut controller = Self {
            ball_id,
            body,
            angular_damping: config.angular_damping,
            velocity_epsilon: config.velocity_epsilon,
            rest_delay: config.rest_delay_secs,
            launch_grace: config.launch_grace_secs,
            start_at_rest: config.start_at_rest,
            is_frozen: config.start_at_rest,
            is_at_rest: config.start_at_rest,
            last_launch_time: now,
            last_moving_time: now,
            is_touching_bounds: true,
            ticks_out_of_bounds: 0,
            events: EventDispatcher::new(),
        };
        controller.body.set_frozen(controller.is_frozen);
        controller
    }

    /// Return to the level-load state at time `now`, keeping listeners.
    /// Used on respawn. Emits nothing.
    pub fn reset(&mut self, now: f64) {
        self.is_frozen = self.start_at_rest;
        self.is_at_rest = self.start_at_rest;
        self.last_launch_time = now;
        self.last_moving_time = now;
        self.is_touching_bounds = true;
        self.ticks_out_of_bounds = 0;
        self.body.set_frozen(self.is_frozen);
        tracing::debug!(ball_id = self.ball_id, now, "Ball controller reset");
    }

    /// Unfreeze the body, apply `impulse` as a velocity change and start
    /// moving. Allowed in any state.
    pub fn launch(&mut self, impulse: Vec3, now: f64) {
        self.is_frozen = false;
        self.body.set_frozen(false);
        self.body.apply_velocity_change(impulse);

        self.is_at_rest = false;
        self.last_launch_time = now;
        tracing::debug!(
            ball_id = self.ball_id,
            now,
            impulse = ?impulse,
            "Ball launched"
        );
        self.emit(BallEventKind::Putt);
    }

    /// Freeze the body and commit to rest. Idempotent apart from
    /// re-emitting `Rest`.
    pub fn rest(&mut self) {
        self.is_at_rest = true;
        self.is_frozen = true;
        self.body.set_frozen(true);
        tracing::debug!(ball_id = self.ball_id, "Ball at rest");
        self.emit(BallEventKind::Rest);
    }

    /// Per-tick update. Runs before the integrator advances.
    pub fn fixed_update(&mut self, now: f64) {
        // Bounds contacts from the previous tick decide this tick's status.
        if self.is_touching_bounds {
            self.ticks_out_of_bounds = 0;
        } else {
            self.ticks_out_of_bounds = self.ticks_out_of_bounds.saturating_add(1);
            if self.ticks_out_of_bounds == 1 {
                tracing::debug!(ball_id = self.ball_id, now, "Ball left bounds");
            }
            self.emit(BallEventKind::OutOfBounds);
        }
        self.is_touching_bounds = false;

        let speed_sq = self.body.linear_velocity().length_squared();
        if speed_sq > self.velocity_epsilon * self.velocity_epsilon {
            self.last_moving_time = now;
        }
        tracing::trace!(
            ball_id = self.ball_id,
            now,
            speed = speed_sq.sqrt(),
            "Sampled ball velocity"
        );

        if !self.is_at_rest
            && now - self.last_moving_time > self.rest_delay
            && now - self.last_launch_time > self.launch_grace
        {
            self.rest();
        }
    }

    /// React to one contact reported by the integrator for the current tick.
    pub fn handle_contact(&mut self, contact: Contact, dt: f32) {
        match contact {
            Contact::SurfaceStay => {
                let damped =
                    damp_angular_velocity(self.body.angular_velocity(), self.angular_damping, dt);
                self.body.set_angular_velocity(damped);
            },
            Contact::TriggerEnter(Region::LevelEnd) => {
                tracing::debug!(ball_id = self.ball_id, "Ball entered goal region");
                self.emit(BallEventKind::Hole);
            },
            Contact::TriggerStay(Region::LevelBounds) => {
                self.is_touching_bounds = true;
            },
            Contact::TriggerEnter(_) | Contact::TriggerStay(_) => {},
        }
    }

    /// Handle every contact from one integrator step.
    pub fn handle_contacts(&mut self, contacts: impl IntoIterator<Item = Contact>, dt: f32) {
        for contact in contacts {
            self.handle_contact(contact, dt);
        }
    }

    /// Register a listener for one event kind.
    pub fn subscribe<F>(&mut self, kind: BallEventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&BallEvent) + Send + 'static,
    {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    pub fn ball_id(&self) -> BallId {
        self.ball_id
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    /// Mutable access for the integrator. Callers must not toggle freezing
    /// behind the controller's back.
    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn is_frozen(&self) -> bool {
        self.is_frozen
    }

    pub fn is_at_rest(&self) -> bool {
        self.is_at_rest
    }

    pub fn is_touching_bounds(&self) -> bool {
        self.is_touching_bounds
    }

    pub fn last_launch_time(&self) -> f64 {
        self.last_launch_time
    }

    pub fn last_moving_time(&self) -> f64 {
        self.last_moving_time
    }

    pub fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    pub fn velocity_epsilon(&self) -> f32 {
        self.velocity_epsilon
    }

    pub fn state(&self) -> MotionState {
        if self.is_at_rest {
            MotionState::Resting
        } else {
            MotionState::Moving
        }
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            is_frozen: self.is_frozen,
            is_at_rest: self.is_at_rest,
            last_launch_time: self.last_launch_time,
            last_moving_time: self.last_moving_time,
            is_touching_bounds: self.is_touching_bounds,
        }
    }

    /// Restore flags and timers. The body's freeze state follows the snapshot.
    pub fn restore(&mut self, snapshot: &ControllerSnapshot) {
        self.is_frozen = snapshot.is_frozen || snapshot.is_at_rest;
        self.is_at_rest = snapshot.is_at_rest;
        self.last_launch_time = snapshot.last_launch_time;
        self.last_moving_time = snapshot.last_moving_time;
        self.is_touching_bounds = snapshot.is_touching_bounds;
        self.ticks_out_of_bounds = 0;
        self.body.set_frozen(self.is_frozen);
    }

    /// Consume the controller and return its body.
    pub fn into_body(self) -> B {
        self.body
    }

    fn emit(&mut self, kind: BallEventKind) {
        self.events.emit(BallEvent {
            ball_id: self.ball_id,
            kind,
        });
    }
}

impl<B: BallBody + std::fmt::Debug> std::fmt::Debug for BallMotionController<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BallMotionController")
            .field("ball_id", &self.ball_id)
            .field("body", &self.body)
            .field("state", &self.state())
            .field("snapshot", &self.snapshot())
            .field("events", &self.events)
            .finish()
    }
}
