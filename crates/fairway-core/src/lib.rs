pub mod body;
pub mod events;
pub mod math;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::body::BallBody;
    use crate::math::Vec3;

    /// A body whose velocities are set directly by the test.
    ///
    /// It performs no integration; tests script the velocity each tick to
    /// model whatever the integrator would have produced.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ScriptedBody {
        pub frozen: bool,
        pub velocity: Vec3,
        pub angular_velocity: Vec3,
        /// Every velocity change applied, in order.
        pub impulses: Vec<Vec3>,
    }

    impl ScriptedBody {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_angular_velocity(angular_velocity: Vec3) -> Self {
            Self {
                angular_velocity,
                ..Self::default()
            }
        }
    }

    impl BallBody for ScriptedBody {
        fn set_frozen(&mut self, frozen: bool) {
            self.frozen = frozen;
        }

        fn apply_velocity_change(&mut self, delta: Vec3) {
            self.velocity += delta;
            self.impulses.push(delta);
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

    /// Timestamps of ticks `first..first + n` at a fixed `dt`, computed by
    /// multiplication so that long runs do not drift.
    pub fn tick_times(first: u64, n: u64, dt: f64) -> impl Iterator<Item = (u64, f64)> {
        (first..first + n).map(move |tick| (tick, tick as f64 * dt))
    }

    /// A speed comfortably above the default stopped threshold.
    pub const MOVING: Vec3 = Vec3::new(2.0, 0.0, 0.0);
    /// A speed comfortably below the default stopped threshold.
    pub const CREEPING: Vec3 = Vec3::new(0.01, 0.0, 0.0);
}
