//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use djkr8_common::{HarmonicLevel, OptimizerConfig};
use std::path::PathBuf;

/// Harmonic-mixing playlist optimizer
#[derive(Parser, Debug)]
#[command(name = "djkr8")]
#[command(about = "Order DJ tracks into the longest, smoothest harmonic-mixing playlist")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (overrides RUST_LOG and the config file)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (takes priority over DJKR8_CONFIG and the default location)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize tracks from a JSON file
    Optimize {
        /// JSON file with a "tracks" array or a bare array of tracks
        input: PathBuf,

        #[command(flatten)]
        options: OptimizeOptions,
    },

    /// List playlists in a Rekordbox library
    Playlists {
        /// Rekordbox library database (unencrypted SQLite)
        #[arg(long, value_name = "PATH")]
        db: PathBuf,
    },

    /// Optimize a playlist from a Rekordbox library
    Rekordbox {
        /// Rekordbox library database (unencrypted SQLite)
        #[arg(long, value_name = "PATH")]
        db: PathBuf,

        /// Playlist name
        playlist: String,

        #[command(flatten)]
        options: OptimizeOptions,
    },
}

/// Flags shared by every optimizing subcommand; unset flags keep config values
#[derive(Args, Debug, Clone, Default)]
pub struct OptimizeOptions {
    /// Write results to a JSON file instead of printing the playlist order
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Tempo tolerance in percent
    #[arg(long, value_name = "PCT")]
    pub bpm_tolerance: Option<f64>,

    /// Allow half/double-time tempo matching
    #[arg(long, overrides_with = "no_halftime")]
    pub halftime: bool,

    /// Disallow half/double-time tempo matching
    #[arg(long, overrides_with = "halftime")]
    pub no_halftime: bool,

    /// Fraction of transitions allowed to clash (0.0-1.0)
    #[arg(long, value_name = "FRACTION")]
    pub max_violations: Option<f64>,

    /// Maximum number of energy-boost transitions
    #[arg(long, value_name = "N")]
    pub max_energy_boosts: Option<u32>,

    /// Objective weight per included track; higher favors longer playlists
    #[arg(long, value_name = "WEIGHT")]
    pub quality_weight: Option<f64>,

    /// strict, moderate or relaxed
    #[arg(long, value_name = "LEVEL")]
    pub harmonic_level: Option<HarmonicLevel>,

    /// Solver time limit in seconds
    #[arg(long, value_name = "SEC")]
    pub time_limit: Option<f64>,

    /// Solver worker threads (0 = all cores, 1 = reproducible)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

impl OptimizeOptions {
    /// `Some(true)` / `Some(false)` when a halftime flag was given
    pub fn halftime_override(&self) -> Option<bool> {
        if self.no_halftime {
            Some(false)
        } else if self.halftime {
            Some(true)
        } else {
            None
        }
    }

    /// Layer command-line flags over file/default configuration
    pub fn apply_to(&self, mut config: OptimizerConfig) -> OptimizerConfig {
        if let Some(v) = self.bpm_tolerance {
            config.bpm_tolerance = v;
        }
        if let Some(v) = self.halftime_override() {
            config.allow_halftime_bpm = v;
        }
        if let Some(v) = self.max_violations {
            config.max_violation_pct = v;
        }
        if let Some(v) = self.max_energy_boosts {
            config.max_energy_boosts = v;
        }
        if let Some(v) = self.quality_weight {
            config.transition_quality_weight = v;
        }
        if let Some(v) = self.harmonic_level {
            config.harmonic_level = v;
        }
        if let Some(v) = self.time_limit {
            config.time_limit_seconds = v;
        }
        if let Some(v) = self.workers {
            config.num_workers = v;
        }
        config
    }
}
