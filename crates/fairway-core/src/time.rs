/// Simulation clock advanced once per fixed tick.
///
/// Timestamps are `f64` seconds computed from the tick index, never summed,
/// so long sessions at high tick rates do not drift the rest timers.
#[derive(Debug, Clone)]
pub struct SimClock {
    dt: f64,
    tick: u64,
}

impl SimClock {
    /// Create a clock stepping at `tick_rate_hz`.
    pub fn new(tick_rate_hz: f32) -> Self {
        Self {
            dt: 1.0 / tick_rate_hz as f64,
            tick: 0,
        }
    }

    /// Fixed delta time per tick in seconds, at integrator precision.
    pub fn dt(&self) -> f32 {
        self.dt as f32
    }

    /// Number of ticks taken so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.tick as f64 * self.dt
    }

    /// Jump to an absolute tick, e.g. when restoring a saved session.
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// Advance by one tick and return the new time.
    pub fn advance(&mut self) -> f64 {
        self.tick += 1;
        self.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_in_fixed_steps() {
        let mut clock = SimClock::new(50.0);
        assert_eq!(clock.now(), 0.0);
        for _ in 0..50 {
            clock.advance();
        }
        assert_eq!(clock.tick(), 50);
        assert_eq!(clock.now(), 1.0);
    }

    #[test]
    fn whole_seconds_land_on_whole_ticks() {
        let mut clock = SimClock::new(50.0);
        clock.set_tick(50 * 3_600);
        assert_eq!(clock.now(), 3_600.0);
        assert!((clock.advance() - 3_600.02).abs() < 1e-9);
        assert_eq!(clock.dt(), 0.02_f32);
    }
}
