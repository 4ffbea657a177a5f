use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "config/sim.toml";

/// Simulator configuration, loaded from `config/sim.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed ticks per simulated second.
    pub tick_rate_hz: f32,
    /// Give up on a putt that has not settled after this many ticks.
    pub max_ticks_per_putt: u32,
    /// Strokes (penalties included) before a hole is abandoned.
    pub max_strokes: u32,
    /// Course to play. Every built-in course when unset.
    pub course: Option<String>,
    pub seed: u64,
    pub aim: AimConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 50.0,
            max_ticks_per_putt: 3_000,
            max_strokes: 10,
            course: None,
            seed: 42,
            aim: AimConfig::default(),
        }
    }
}

/// How sloppy the simulated golfer is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimConfig {
    /// Maximum heading error in radians, either side.
    pub heading_jitter: f32,
    /// Maximum fractional power error, either side.
    pub power_jitter: f32,
    /// Hardest putt allowed, in world units per second.
    pub max_speed: f32,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            heading_jitter: 0.08,
            power_jitter: 0.15,
            max_speed: 15.0,
        }
    }
}

impl SimConfig {
    /// Load from `FAIRWAY_SIM_CONFIG` or `config/sim.toml` if present, then
    /// apply `FAIRWAY_*` environment overrides.
    pub fn load() -> Self {
        let path =
            std::env::var("FAIRWAY_SIM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<SimConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded simulator configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    SimConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                SimConfig::default()
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `FAIRWAY_*` overrides read through `var`. Unparseable values
    /// are ignored with a warning.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(course) = var("FAIRWAY_COURSE")
            && !course.is_empty()
        {
            self.course = Some(course);
        }
        override_parsed(&var, "FAIRWAY_SEED", &mut self.seed);
        override_parsed(&var, "FAIRWAY_TICK_RATE", &mut self.tick_rate_hz);
        override_parsed(&var, "FAIRWAY_MAX_TICKS", &mut self.max_ticks_per_putt);
        override_parsed(&var, "FAIRWAY_MAX_STROKES", &mut self.max_strokes);
    }

    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(format!("tick_rate_hz must be > 0, got {}", self.tick_rate_hz));
        }
        if self.max_ticks_per_putt == 0 {
            return Err("max_ticks_per_putt must be > 0".to_string());
        }
        if self.max_strokes == 0 {
            return Err("max_strokes must be > 0".to_string());
        }
        if !self.aim.max_speed.is_finite() || self.aim.max_speed <= 0.0 {
            return Err("aim.max_speed must be > 0".to_string());
        }
        for (name, jitter) in [
            ("aim.heading_jitter", self.aim.heading_jitter),
            ("aim.power_jitter", self.aim.power_jitter),
        ] {
            if !jitter.is_finite() || jitter < 0.0 {
                return Err(format!("{name} must be a finite value >= 0, got {jitter}"));
            }
        }
        Ok(())
    }
}

fn override_parsed<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) {
    let Some(raw) = var(key) else {
        return;
    };
    match raw.parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(key, value = %raw, "Ignoring unparseable override"),
    }
}
