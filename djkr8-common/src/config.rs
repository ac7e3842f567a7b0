//! Optimizer configuration and config file resolution
//!
//! Config file priority:
//! 1. Explicit path (command-line `--config`)
//! 2. `DJKR8_CONFIG` environment variable
//! 3. `<config dir>/djkr8/config.toml`
//! 4. Compiled defaults
//!
//! Command-line flags override whatever the file provides.

use crate::camelot::HarmonicLevel;
use crate::graph::GraphParams;
use crate::solver::SolveParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "DJKR8_CONFIG";

/// Upper bound on the solve time limit (one day)
const MAX_TIME_LIMIT_SECONDS: f64 = 86_400.0;

const MAX_WORKERS: usize = 256;

/// Upper bound on the per-track weight; keeps scaled objective sums within i64
const MAX_TRANSITION_QUALITY_WEIGHT: f64 = 1e6;

/// Parameters of one optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Maximum relative tempo gap for a direct match, in percent (default: 10.0)
    #[serde(default = "default_bpm_tolerance")]
    pub bpm_tolerance: f64,

    /// Allow half-time and double-time tempo matching (default: true)
    #[serde(default = "default_allow_halftime_bpm")]
    pub allow_halftime_bpm: bool,

    /// Fraction of transitions that may be tolerated clashes (default: 0.10)
    #[serde(default = "default_max_violation_pct")]
    pub max_violation_pct: f64,

    /// Maximum number of energy-boost transitions (default: 3)
    #[serde(default = "default_max_energy_boosts")]
    pub max_energy_boosts: u32,

    /// Which key relations count as harmonic (default: strict)
    #[serde(default)]
    pub harmonic_level: HarmonicLevel,

    /// Objective weight of each included track (default: 10.0)
    #[serde(default = "default_transition_quality_weight")]
    pub transition_quality_weight: f64,

    /// Wall-clock solve budget in seconds (default: 60.0)
    #[serde(default = "default_time_limit_seconds")]
    pub time_limit_seconds: f64,

    /// Solver worker threads, 0 = available parallelism (default: 0)
    #[serde(default)]
    pub num_workers: usize,
}

fn default_bpm_tolerance() -> f64 {
    10.0
}

fn default_allow_halftime_bpm() -> bool {
    true
}

fn default_max_violation_pct() -> f64 {
    0.10
}

fn default_max_energy_boosts() -> u32 {
    3
}

fn default_transition_quality_weight() -> f64 {
    10.0
}

fn default_time_limit_seconds() -> f64 {
    60.0
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            bpm_tolerance: default_bpm_tolerance(),
            allow_halftime_bpm: default_allow_halftime_bpm(),
            max_violation_pct: default_max_violation_pct(),
            max_energy_boosts: default_max_energy_boosts(),
            harmonic_level: HarmonicLevel::default(),
            transition_quality_weight: default_transition_quality_weight(),
            time_limit_seconds: default_time_limit_seconds(),
            num_workers: 0,
        }
    }
}

impl OptimizerConfig {
    /// Reject out-of-range parameters before any work starts
    pub fn validate(&self) -> Result<()> {
        if !self.bpm_tolerance.is_finite() || self.bpm_tolerance <= 0.0 || self.bpm_tolerance > 100.0 {
            return Err(Error::Config(format!(
                "bpm_tolerance must be in (0, 100] percent, got {}",
                self.bpm_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.max_violation_pct) {
            return Err(Error::Config(format!(
                "max_violation_pct must be a fraction in [0, 1], got {}",
                self.max_violation_pct
            )));
        }
        if !(0.0..=MAX_TRANSITION_QUALITY_WEIGHT).contains(&self.transition_quality_weight) {
            return Err(Error::Config(format!(
                "transition_quality_weight must be in [0, {}], got {}",
                MAX_TRANSITION_QUALITY_WEIGHT, self.transition_quality_weight
            )));
        }
        if !self.time_limit_seconds.is_finite()
            || self.time_limit_seconds <= 0.0
            || self.time_limit_seconds > MAX_TIME_LIMIT_SECONDS
        {
            return Err(Error::Config(format!(
                "time_limit_seconds must be in (0, {}], got {}",
                MAX_TIME_LIMIT_SECONDS, self.time_limit_seconds
            )));
        }
        if self.num_workers > MAX_WORKERS {
            return Err(Error::Config(format!(
                "num_workers must be at most {}, got {}",
                MAX_WORKERS, self.num_workers
            )));
        }
        Ok(())
    }

    pub fn graph_params(&self) -> GraphParams {
        GraphParams {
            bpm_tolerance: self.bpm_tolerance,
            allow_halftime_bpm: self.allow_halftime_bpm,
            harmonic_level: self.harmonic_level,
        }
    }

    pub fn solve_params(&self) -> SolveParams {
        SolveParams::new(Duration::from_secs_f64(self.time_limit_seconds)).with_workers(self.num_workers)
    }
}

/// Logging section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Whole config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.optimizer.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
    }
}

/// Default per-user config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("djkr8").join("config.toml"))
}

/// Find the config file to use, if any
///
/// An explicitly named file (argument or environment) must exist; the
/// per-user default is used only when present.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return require_exists(path.to_path_buf()).map(Some);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return require_exists(PathBuf::from(path)).map(Some);
        }
    }

    // Priority 3: Per-user default, only if present
    Ok(default_config_path().filter(|p| p.exists()))
}

fn require_exists(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {}", path.display())))
    }
}

/// Resolve and load configuration, falling back to compiled defaults
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg)? {
        Some(path) => {
            let config = TomlConfig::load(&path)?;
            tracing::debug!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(TomlConfig::default()),
    }
}
