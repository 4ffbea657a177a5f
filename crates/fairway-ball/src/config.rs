use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Seconds of continuous stillness before a ball is committed to rest.
pub const REST_DELAY_SECS: f64 = 1.0;
/// Seconds after a launch during which a ball can never be rested.
pub const LAUNCH_GRACE_SECS: f64 = 1.0;
/// Default rolling spin loss while in surface contact (rad/s per second).
pub const ANGULAR_DAMPING: f32 = 6.0;
/// Default speed at or below which the ball counts as stopped.
pub const VELOCITY_EPSILON: f32 = 0.05;

/// Environment variable naming a TOML file to load instead of the default path.
pub const CONFIG_ENV_VAR: &str = "FAIRWAY_BALL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/ball.toml";

/// Tuning for a single ball's motion controller, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Spin deceleration applied each tick of sustained surface contact.
    pub angular_damping: f32,
    /// Linear speed threshold for "stopped".
    pub velocity_epsilon: f32,
    /// Required stillness before resting.
    pub rest_delay_secs: f64,
    /// Required time since the last launch before resting.
    pub launch_grace_secs: f64,
    /// Whether the ball starts frozen and at rest when the level loads.
    pub start_at_rest: bool,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            angular_damping: ANGULAR_DAMPING,
            velocity_epsilon: VELOCITY_EPSILON,
            rest_delay_secs: REST_DELAY_SECS,
            launch_grace_secs: LAUNCH_GRACE_SECS,
            start_at_rest: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "failed to parse {}: {source}", path.display()),
            Self::Parse { path: None, source } => write!(f, "failed to parse config: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// A suspicious configuration value. The controller accepts any value;
/// hosts decide whether an issue is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    NegativeAngularDamping(f32),
    NegativeVelocityEpsilon(f32),
    NegativeRestDelay(f64),
    NegativeLaunchGrace(f64),
    NonFinite(&'static str),
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAngularDamping(v) => write!(f, "angular_damping is negative ({v})"),
            Self::NegativeVelocityEpsilon(v) => write!(f, "velocity_epsilon is negative ({v})"),
            Self::NegativeRestDelay(v) => write!(f, "rest_delay_secs is negative ({v})"),
            Self::NegativeLaunchGrace(v) => write!(f, "launch_grace_secs is negative ({v})"),
            Self::NonFinite(field) => write!(f, "{field} is not a finite number"),
        }
    }
}

impl BallConfig {
    /// Parse a config from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Read and parse a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Load config from `FAIRWAY_BALL_CONFIG` or `config/ball.toml`, falling
    /// back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::from_path(&path) {
            Ok(cfg) => {
                tracing::info!(path = %path, "Loaded ball configuration");
                cfg
            },
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path, "No ball config found, using defaults");
                Self::default()
            },
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Self::default()
            },
        }
    }

    /// Report values a host would likely consider misconfigured.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !self.angular_damping.is_finite() {
            issues.push(ConfigIssue::NonFinite("angular_damping"));
        } else if self.angular_damping < 0.0 {
            issues.push(ConfigIssue::NegativeAngularDamping(self.angular_damping));
        }
        if !self.velocity_epsilon.is_finite() {
            issues.push(ConfigIssue::NonFinite("velocity_epsilon"));
        } else if self.velocity_epsilon < 0.0 {
            issues.push(ConfigIssue::NegativeVelocityEpsilon(self.velocity_epsilon));
        }
        if !self.rest_delay_secs.is_finite() {
            issues.push(ConfigIssue::NonFinite("rest_delay_secs"));
        } else if self.rest_delay_secs < 0.0 {
            issues.push(ConfigIssue::NegativeRestDelay(self.rest_delay_secs));
        }
        if !self.launch_grace_secs.is_finite() {
            issues.push(ConfigIssue::NonFinite("launch_grace_secs"));
        } else if self.launch_grace_secs < 0.0 {
            issues.push(ConfigIssue::NegativeLaunchGrace(self.launch_grace_secs));
        }
        issues
    }
}
