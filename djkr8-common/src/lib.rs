//! # djkr8 Common Library
//!
//! Harmonic-mixing playlist optimizer core shared by the CLI and track sources:
//! - Camelot key and tempo compatibility
//! - Transition graph over an input track set
//! - Constraint model, solver interface and the bundled branch-and-bound engine
//! - Playlist optimizer (formulation, solve, decode) and statistics
//! - Configuration loading

pub mod bpm;
pub mod camelot;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod optimizer;
pub mod solver;
pub mod statistics;

pub use camelot::{CamelotKey, HarmonicLevel, KeyRelation};
pub use config::{OptimizerConfig, TomlConfig};
pub use error::{Error, Result};
pub use graph::TransitionType;
pub use models::{PlaylistResult, PlaylistStatistics, SolverStatus, Track, Transition};
pub use optimizer::PlaylistOptimizer;
