//! Core data model: tracks, transitions and optimization results

use crate::camelot::{parse_camelot_key, CamelotKey};
use crate::graph::TransitionType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A track to be sequenced. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    id: String,
    key: CamelotKey,
    bpm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    energy: Option<u8>,
    /// Seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl Track {
    /// Validate and build a track from its required fields
    pub fn new(id: impl Into<String>, key: &str, bpm: f64) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidTrackData("track id must not be empty".to_string()));
        }
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(Error::InvalidTrackData(format!(
                "track '{}' has non-positive tempo {}",
                id, bpm
            )));
        }
        let key = parse_camelot_key(key)?;
        Ok(Self {
            id,
            key,
            bpm,
            energy: None,
            duration: None,
            title: None,
        })
    }

    pub fn with_energy(mut self, energy: u8) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> CamelotKey {
        self.key
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn energy(&self) -> Option<u8> {
        self.energy
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {:.1} BPM)", self.id, self.key, self.bpm)
    }
}

/// Reject empty inputs and duplicate ids before any graph is built
pub fn validate_tracks(tracks: &[Track]) -> Result<()> {
    if tracks.is_empty() {
        return Err(Error::InvalidTrackData("no tracks given".to_string()));
    }
    let mut seen = HashSet::with_capacity(tracks.len());
    for track in tracks {
        if !seen.insert(track.id()) {
            return Err(Error::InvalidTrackData(format!(
                "duplicate track id '{}'",
                track.id()
            )));
        }
    }
    Ok(())
}

/// A realized transition between two consecutive playlist tracks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub from_track: Track,
    pub to_track: Track,
    /// 0.0-1.0
    pub quality_score: f64,
    pub transition_type: TransitionType,
    /// Absolute direct tempo gap
    pub bpm_difference: f64,
    /// True for harmonic and energy-boost transitions
    pub is_harmonic: bool,
}

/// Outcome reported by the solve step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// Proved best
    Optimal,
    /// Valid, possibly improvable; time limit reached
    Feasible,
    /// No sequence of two or more tracks satisfies the constraints
    Infeasible,
    /// Time limit reached before any solution was found
    TimeoutNoSolution,
}

impl SolverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::TimeoutNoSolution => "TIMEOUT_NO_SOLUTION",
        }
    }

    pub fn has_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics of a decoded playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistStatistics {
    pub total_input_tracks: usize,
    pub playlist_length: usize,
    pub coverage_pct: f64,
    pub harmonic_transitions: usize,
    pub non_harmonic_transitions: usize,
    pub energy_boost_transitions: usize,
    pub harmonic_pct: f64,
    pub avg_bpm: f64,
    pub bpm_range: (f64, f64),
}

/// Ordered playlist plus how it was obtained
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistResult {
    pub playlist: Vec<Track>,
    pub transitions: Vec<Transition>,
    pub statistics: Option<PlaylistStatistics>,
    pub solver_status: SolverStatus,
    pub solver_time_seconds: f64,
}

impl PlaylistResult {
    /// Result carrying no playlist, used for infeasible and timed-out solves
    pub fn empty(status: SolverStatus, solver_time_seconds: f64) -> Self {
        Self {
            playlist: Vec::new(),
            transitions: Vec::new(),
            statistics: None,
            solver_status: status,
            solver_time_seconds,
        }
    }

    pub fn energy_boost_count(&self) -> usize {
        self.transitions
            .iter()
            .filter(|t| t.transition_type == TransitionType::EnergyBoost)
            .count()
    }

    pub fn clash_count(&self) -> usize {
        self.transitions
            .iter()
            .filter(|t| t.transition_type == TransitionType::ToleratedClash)
            .count()
    }

    /// Turn "no playlist" outcomes into errors; a FEASIBLE result passes through
    pub fn ensure_playlist(self) -> Result<Self> {
        match self.solver_status {
            SolverStatus::Optimal => Ok(self),
            SolverStatus::Feasible => {
                tracing::warn!(
                    "Time limit reached after {:.2}s without proving optimality; returning best playlist found",
                    self.solver_time_seconds
                );
                Ok(self)
            }
            SolverStatus::Infeasible => Err(Error::NoFeasibleSolution(
                "no sequence of two or more tracks satisfies the tempo, key and budget constraints".to_string(),
            )),
            SolverStatus::TimeoutNoSolution => Err(Error::SolverTimeout(format!(
                "no playlist found within {:.2}s",
                self.solver_time_seconds
            ))),
        }
    }
}
