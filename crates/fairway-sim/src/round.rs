use rand::Rng;
use serde::Serialize;

use fairway_ball::course::Course;
use fairway_ball::{BallConfig, LevelSession, SessionOutcome};
use fairway_core::events::BallId;

use crate::aim::plan_putt;
use crate::config::SimConfig;

/// Summary printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub seed: u64,
    pub tick_rate_hz: f32,
    pub holes: Vec<SessionOutcome>,
    pub total_strokes: u32,
    pub total_score: i32,
}

/// Play every course in order, one ball per course.
pub fn play_round<R: Rng>(
    courses: Vec<Course>,
    ball: &BallConfig,
    sim: &SimConfig,
    rng: &mut R,
) -> SimReport {
    let holes: Vec<SessionOutcome> = courses
        .into_iter()
        .zip(1..)
        .map(|(course, ball_id)| play_course(ball_id, course, ball, sim, rng))
        .collect();

    SimReport {
        seed: sim.seed,
        tick_rate_hz: sim.tick_rate_hz,
        total_strokes: holes.iter().map(|h| h.strokes).sum(),
        total_score: holes.iter().map(|h| h.score).sum(),
        holes,
    }
}

/// Putt until the ball is holed, the stroke limit is reached or a putt
/// fails to settle.
pub fn play_course<R: Rng>(
    ball_id: BallId,
    course: Course,
    ball: &BallConfig,
    sim: &SimConfig,
    rng: &mut R,
) -> SessionOutcome {
    let mut session = LevelSession::new(ball_id, course, ball, sim.tick_rate_hz);

    while !session.is_holed() && session.total_strokes() < sim.max_strokes {
        let from = session.controller().body().position;
        let impulse = plan_putt(rng, from, session.course().hole_position, &sim.aim);
        if let Err(e) = session.putt(impulse) {
            tracing::warn!(ball_id, error = %e, "Putt refused");
            break;
        }
        tracing::debug!(ball_id, impulse = ?impulse, stroke = session.total_strokes(), "Putt");

        for event in session.run_until_rest(sim.max_ticks_per_putt) {
            tracing::info!(ball_id, event = %event.kind, now = session.now(), "Ball event");
        }
        if !session.controller().is_at_rest() {
            tracing::warn!(
                ball_id,
                max_ticks = sim.max_ticks_per_putt,
                "Ball never settled, abandoning hole"
            );
            break;
        }
    }

    let outcome = session.outcome();
    tracing::info!(
        ball_id,
        course = %outcome.course,
        strokes = outcome.strokes,
        holed = outcome.holed,
        score = outcome.score,
        result = outcome.result.as_deref().unwrap_or("not holed"),
        "Hole finished"
    );
    outcome
}
