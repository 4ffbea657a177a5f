use std::process::ExitCode;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use fairway_ball::BallConfig;
use fairway_ball::course::{all_courses, course_by_name};

mod aim;
mod config;
mod round;

use config::SimConfig;

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the JSON report.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if std::env::var("FAIRWAY_LOG_FORMAT").is_ok_and(|f| f == "json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!("Fairway simulator starting");

    let ball = BallConfig::load();
    for issue in ball.validate() {
        tracing::warn!(%issue, "Questionable ball configuration");
    }

    let sim = SimConfig::load();
    if let Err(e) = sim.validate() {
        tracing::error!("Invalid simulator configuration: {e}");
        return ExitCode::FAILURE;
    }

    let courses = match sim.course.as_deref() {
        Some(name) => match course_by_name(name) {
            Some(course) => vec![course],
            None => {
                tracing::error!(course = name, "Unknown course");
                return ExitCode::FAILURE;
            },
        },
        None => all_courses(),
    };

    let mut rng = StdRng::seed_from_u64(sim.seed);
    let report = round::play_round(courses, &ball, &sim, &mut rng);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!("Failed to encode report: {e}");
            ExitCode::FAILURE
        },
    }
}
