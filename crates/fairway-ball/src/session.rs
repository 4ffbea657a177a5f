use serde::{Deserialize, Serialize};

use fairway_core::events::{BallEvent, BallEventKind, BallId, EventLog};
use fairway_core::math::Vec3;
use fairway_core::time::SimClock;

use crate::config::BallConfig;
use crate::controller::{BallMotionController, ControllerSnapshot};
use crate::course::Course;
use crate::physics::SimpleBody;
use crate::scoring::{calculate_score, score_name};

/// Why a putt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuttRejected {
    /// The ball is already in the hole.
    Holed,
    /// The ball has not come to rest yet.
    StillMoving,
}

impl std::fmt::Display for PuttRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Holed => write!(f, "ball is already holed"),
            Self::StillMoving => write!(f, "ball is still moving"),
        }
    }
}

impl std::error::Error for PuttRejected {}

/// Result of a level, reported once the ball is holed or play stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub course: String,
    pub par: u8,
    /// Strokes played plus penalty strokes.
    pub strokes: u32,
    pub penalty_strokes: u32,
    pub respawns: u32,
    pub holed: bool,
    pub score: i32,
    /// Stroke count named relative to par ("birdie", "bogey", ...). Unset
    /// until the ball is holed.
    pub result: Option<String>,
    pub elapsed_secs: f64,
}

/// Everything needed to resume a session, minus listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub tick: u64,
    pub controller: ControllerSnapshot,
    pub body: SimpleBody,
    pub strokes: u32,
    pub penalty_strokes: u32,
    pub respawns: u32,
    pub holed_at: Option<f64>,
    pub last_lie: Vec3,
}

impl SessionSnapshot {
    /// Encode as MessagePack.
    pub fn to_bytes(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

/// Game-flow driver for one ball on one course.
///
/// Runs the reference integrator under a [`BallMotionController`] and
/// consumes its events the way a game would: counting strokes on `Putt`,
/// scoring the first `Hole` only, and respawning at the last lie (with a
/// penalty stroke) on the first `OutOfBounds` of an excursion.
pub struct LevelSession {
    course: Course,
    controller: BallMotionController<SimpleBody>,
    clock: SimClock,
    inbox: EventLog,
    strokes: u32,
    penalty_strokes: u32,
    respawns: u32,
    holed_at: Option<f64>,
    last_lie: Vec3,
}

impl LevelSession {
    pub fn new(ball_id: BallId, course: Course, config: &BallConfig, tick_rate_hz: f32) -> Self {
        let clock = SimClock::new(tick_rate_hz);
        let body = SimpleBody::new(course.spawn_point);
        let mut controller = BallMotionController::new(ball_id, body, config, clock.now());
        let inbox = EventLog::new();
        inbox.attach(controller.events_mut());

        tracing::info!(
            ball_id,
            course = %course.name,
            par = course.par,
            tick_rate_hz,
            "Level loaded"
        );

        Self {
            last_lie: course.spawn_point,
            course,
            controller,
            clock,
            inbox,
            strokes: 0,
            penalty_strokes: 0,
            respawns: 0,
            holed_at: None,
        }
    }

    /// Take a stroke. Only allowed while the ball is at rest and not holed.
    pub fn putt(&mut self, impulse: Vec3) -> Result<(), PuttRejected> {
        if self.holed_at.is_some() {
            return Err(PuttRejected::Holed);
        }
        if !self.controller.is_at_rest() {
            return Err(PuttRejected::StillMoving);
        }
        self.controller.launch(impulse, self.clock.now());
        self.drain_and_react();
        Ok(())
    }

    /// Run one fixed tick and return the events it produced.
    pub fn step(&mut self) -> Vec<BallEvent> {
        let now = self.clock.now();
        let dt = self.clock.dt();

        self.controller.fixed_update(now);
        let contacts = self.controller.body_mut().step(&self.course, dt);
        self.controller.handle_contacts(contacts, dt);

        let events = self.drain_and_react();
        self.clock.advance();
        events
    }

    /// Step until the ball is at rest, or `max_ticks` have run.
    pub fn run_until_rest(&mut self, max_ticks: u32) -> Vec<BallEvent> {
        let mut events = Vec::new();
        for _ in 0..max_ticks {
            events.extend(self.step());
            if self.controller.is_at_rest() {
                break;
            }
        }
        events
    }

    fn drain_and_react(&mut self) -> Vec<BallEvent> {
        let events = self.inbox.drain();
        let now = self.clock.now();
        let mut respawned = false;
        for event in &events {
            match event.kind {
                BallEventKind::Putt => {
                    if self.holed_at.is_none() {
                        self.strokes += 1;
                    }
                },
                BallEventKind::Rest => {
                    let position = self.controller.body().position;
                    if self.holed_at.is_none() && self.course.in_bounds(position) {
                        self.last_lie = position;
                    }
                },
                BallEventKind::Hole => {
                    if self.holed_at.is_none() {
                        self.holed_at = Some(now);
                        tracing::info!(
                            ball_id = event.ball_id,
                            strokes = self.total_strokes(),
                            now,
                            "Ball holed"
                        );
                    } else {
                        tracing::debug!(ball_id = event.ball_id, "Ignoring repeat hole event");
                    }
                },
                BallEventKind::OutOfBounds => {
                    if !respawned && self.holed_at.is_none() {
                        respawned = true;
                        self.respawn(now);
                    }
                },
            }
        }
        events
    }

    fn respawn(&mut self, now: f64) {
        self.penalty_strokes += 1;
        self.respawns += 1;
        tracing::info!(
            ball_id = self.controller.ball_id(),
            lie = ?self.last_lie,
            penalty_strokes = self.penalty_strokes,
            "Ball out of bounds, respawning"
        );
        let lie = self.last_lie;
        self.controller.body_mut().teleport(lie);
        self.controller.reset(now);
    }

    pub fn is_holed(&self) -> bool {
        self.holed_at.is_some()
    }

    /// Strokes played plus penalties.
    pub fn total_strokes(&self) -> u32 {
        self.strokes + self.penalty_strokes
    }

    pub fn respawns(&self) -> u32 {
        self.respawns
    }

    pub fn last_lie(&self) -> Vec3 {
        self.last_lie
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn controller(&self) -> &BallMotionController<SimpleBody> {
        &self.controller
    }

    /// Direct controller access, e.g. to subscribe extra listeners.
    pub fn controller_mut(&mut self) -> &mut BallMotionController<SimpleBody> {
        &mut self.controller
    }

    pub fn outcome(&self) -> SessionOutcome {
        let holed = self.is_holed();
        SessionOutcome {
            course: self.course.name.clone(),
            par: self.course.par,
            strokes: self.total_strokes(),
            penalty_strokes: self.penalty_strokes,
            respawns: self.respawns,
            holed,
            score: calculate_score(self.total_strokes(), self.course.par, holed),
            result: holed.then(|| score_name(self.total_strokes(), self.course.par).to_string()),
            elapsed_secs: self.holed_at.unwrap_or_else(|| self.clock.now()),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tick: self.clock.tick(),
            controller: self.controller.snapshot(),
            body: self.controller.body().clone(),
            strokes: self.strokes,
            penalty_strokes: self.penalty_strokes,
            respawns: self.respawns,
            holed_at: self.holed_at,
            last_lie: self.last_lie,
        }
    }

    /// Resume from a snapshot taken on the same course.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) {
        self.clock.set_tick(snapshot.tick);
        *self.controller.body_mut() = snapshot.body.clone();
        self.controller.restore(&snapshot.controller);
        self.strokes = snapshot.strokes;
        self.penalty_strokes = snapshot.penalty_strokes;
        self.respawns = snapshot.respawns;
        self.holed_at = snapshot.holed_at;
        self.last_lie = snapshot.last_lie;
        self.inbox.drain();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{cliff_edge, practice_green};

    const TICK_RATE: f32 = 50.0;
    const MAX_TICKS: u32 = 2_000;

    fn session(course: Course) -> LevelSession {
        LevelSession::new(1, course, &BallConfig::default(), TICK_RATE)
    }

    #[test]
    fn new_session_waits_at_spawn() {
        let s = session(practice_green());
        assert!(s.controller().is_at_rest());
        assert_eq!(s.controller().body().position, s.course().spawn_point);
        assert_eq!(s.total_strokes(), 0);
    }

    #[test]
    fn putt_counts_a_stroke_and_ball_comes_to_rest() {
        let mut s = session(practice_green());
        s.putt(Vec3::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(s.total_strokes(), 1);

        let events = s.run_until_rest(MAX_TICKS);

        assert!(s.controller().is_at_rest());
        assert!(events.iter().any(|e| e.kind == BallEventKind::Rest));
        assert!(s.controller().body().position.z > s.course().spawn_point.z);
        assert_eq!(s.last_lie(), s.controller().body().position);
    }

    #[test]
    fn putt_rejected_while_moving() {
        let mut s = session(practice_green());
        s.putt(Vec3::new(0.0, 0.0, 3.0)).unwrap();
        s.step();
        assert_eq!(s.putt(Vec3::new(0.0, 0.0, 3.0)), Err(PuttRejected::StillMoving));
        assert_eq!(s.total_strokes(), 1);
    }

    #[test]
    fn straight_putt_holes_and_scores() {
        let mut s = session(practice_green());
        // Carries about 18.9 units on this friction; the cup is 18 away.
        s.putt(Vec3::new(0.0, 0.0, 13.0)).unwrap();
        s.run_until_rest(MAX_TICKS);

        assert!(s.is_holed(), "ball at {:?}", s.controller().body().position);
        let outcome = s.outcome();
        assert!(outcome.holed);
        assert_eq!(outcome.strokes, 1);
        // Hole in one on a par 2: (2-1)*2
        assert_eq!(outcome.score, 2);
        assert_eq!(outcome.result.as_deref(), Some("hole in one"));
        assert_eq!(s.putt(Vec3::new(0.0, 0.0, 1.0)), Err(PuttRejected::Holed));
    }

    #[test]
    fn rolling_off_the_cliff_respawns_with_penalty() {
        let mut s = session(cliff_edge());
        s.putt(Vec3::new(12.0, 0.0, 0.0)).unwrap();
        let events = s.run_until_rest(MAX_TICKS);

        let oob = events
            .iter()
            .filter(|e| e.kind == BallEventKind::OutOfBounds)
            .count();
        assert_eq!(oob, 1, "respawn ends the excursion after one event");
        assert_eq!(s.respawns(), 1);
        assert_eq!(s.total_strokes(), 2, "stroke plus penalty");
        assert_eq!(s.outcome().result, None, "not holed yet");
        assert!(s.controller().is_at_rest());
        assert_eq!(s.controller().body().position, s.course().spawn_point);
    }

    #[test]
    fn repeat_hole_events_score_once() {
        let mut s = session(practice_green());
        s.putt(Vec3::new(0.0, 0.0, 13.0)).unwrap();
        s.run_until_rest(MAX_TICKS);
        assert!(s.is_holed());
        let first = s.outcome();

        // Knock the ball out of the cup. It rebounds off the north wall and
        // drops back in.
        let now = s.now();
        s.controller_mut().launch(Vec3::new(0.0, 0.0, 5.0), now);
        let events = s.run_until_rest(MAX_TICKS);

        assert!(events.iter().any(|e| e.kind == BallEventKind::Hole));
        assert_eq!(s.outcome().elapsed_secs, first.elapsed_secs);
        assert_eq!(s.outcome().score, first.score);
    }

    #[test]
    fn snapshot_resumes_mid_roll() {
        let mut s = session(practice_green());
        s.putt(Vec3::new(0.0, 0.0, 3.0)).unwrap();
        for _ in 0..10 {
            s.step();
        }
        let bytes = s.snapshot().to_bytes().unwrap();

        s.run_until_rest(MAX_TICKS);
        let expected = s.controller().body().position;

        let mut resumed = session(practice_green());
        resumed.restore(&SessionSnapshot::from_bytes(&bytes).unwrap());
        assert_eq!(resumed.total_strokes(), 1);
        resumed.run_until_rest(MAX_TICKS);

        assert_eq!(resumed.controller().body().position, expected);
    }
}
