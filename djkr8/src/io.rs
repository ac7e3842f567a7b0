//! JSON track input and result output
//!
//! Input is either `{"tracks": [...]}` or a bare array of track objects.
//! Each object needs `id`, `key` and `bpm`; `energy`, `duration` and `title`
//! are optional.

use djkr8_common::{Error, PlaylistResult, PlaylistStatistics, Result, Track, TransitionType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TrackInput {
    id: String,
    key: String,
    bpm: f64,
    #[serde(default)]
    energy: Option<u8>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    title: Option<String>,
}

impl TrackInput {
    fn into_track(self) -> Result<Track> {
        let mut track = Track::new(self.id, &self.key, self.bpm)?;
        if let Some(energy) = self.energy {
            track = track.with_energy(energy);
        }
        if let Some(duration) = self.duration {
            track = track.with_duration(duration);
        }
        if let Some(title) = self.title {
            track = track.with_title(title);
        }
        Ok(track)
    }
}

/// Parse tracks from JSON text
pub fn parse_tracks(content: &str) -> Result<Vec<Track>> {
    let data: Value = serde_json::from_str(content)?;
    let items = match data {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("tracks") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidTrackData(
                    "JSON must contain a 'tracks' array or be an array of tracks".to_string(),
                ))
            }
        },
        _ => {
            return Err(Error::InvalidTrackData(
                "JSON must contain a 'tracks' array or be an array of tracks".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(Error::InvalidTrackData(format!(
                    "track #{} must be an object, got {}",
                    i + 1,
                    item
                )));
            }
            let input: TrackInput = serde_json::from_value(item)
                .map_err(|e| Error::InvalidTrackData(format!("track #{}: {}", i + 1, e)))?;
            input.into_track()
        })
        .collect()
}

/// Load tracks from a JSON file
pub fn load_tracks_from_json(path: &Path) -> Result<Vec<Track>> {
    let content = std::fs::read_to_string(path)?;
    parse_tracks(&content)
}

#[derive(Debug, Serialize)]
pub struct OutputTrack {
    pub id: String,
    pub key: String,
    pub bpm: f64,
}

#[derive(Debug, Serialize)]
pub struct OutputTransition {
    pub from: String,
    pub to: String,
    pub is_harmonic: bool,
    pub bpm_difference: f64,
    pub transition_type: TransitionType,
    pub quality_score: f64,
}

#[derive(Debug, Serialize)]
pub struct OutputStatistics {
    pub total_input_tracks: usize,
    pub playlist_length: usize,
    pub coverage_pct: f64,
    pub harmonic_transitions: usize,
    pub non_harmonic_transitions: usize,
    pub energy_boost_transitions: usize,
    pub harmonic_pct: f64,
    pub avg_bpm: f64,
    pub bpm_range: [f64; 2],
}

impl From<&PlaylistStatistics> for OutputStatistics {
    fn from(stats: &PlaylistStatistics) -> Self {
        Self {
            total_input_tracks: stats.total_input_tracks,
            playlist_length: stats.playlist_length,
            coverage_pct: round_to(stats.coverage_pct, 2),
            harmonic_transitions: stats.harmonic_transitions,
            non_harmonic_transitions: stats.non_harmonic_transitions,
            energy_boost_transitions: stats.energy_boost_transitions,
            harmonic_pct: round_to(stats.harmonic_pct, 2),
            avg_bpm: round_to(stats.avg_bpm, 2),
            bpm_range: [stats.bpm_range.0, stats.bpm_range.1],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutputSolver {
    pub status: String,
    pub time_seconds: f64,
}

/// Result file layout
#[derive(Debug, Serialize)]
pub struct OutputFile {
    pub playlist: Vec<OutputTrack>,
    pub transitions: Vec<OutputTransition>,
    /// Empty object when the result has no statistics
    pub statistics: Value,
    pub solver: OutputSolver,
}

impl OutputFile {
    pub fn from_result(result: &PlaylistResult) -> Result<Self> {
        let statistics = match &result.statistics {
            Some(stats) => serde_json::to_value(OutputStatistics::from(stats))?,
            None => Value::Object(Default::default()),
        };
        Ok(Self {
            playlist: result
                .playlist
                .iter()
                .map(|t| OutputTrack {
                    id: t.id().to_string(),
                    key: t.key().to_string(),
                    bpm: t.bpm(),
                })
                .collect(),
            transitions: result
                .transitions
                .iter()
                .map(|t| OutputTransition {
                    from: t.from_track.id().to_string(),
                    to: t.to_track.id().to_string(),
                    is_harmonic: t.is_harmonic,
                    bpm_difference: round_to(t.bpm_difference, 2),
                    transition_type: t.transition_type,
                    quality_score: round_to(t.quality_score, 3),
                })
                .collect(),
            statistics,
            solver: OutputSolver {
                status: result.solver_status.to_string(),
                time_seconds: round_to(result.solver_time_seconds, 3),
            },
        })
    }
}

/// Write a result as pretty-printed JSON
pub fn save_result_to_json(result: &PlaylistResult, path: &Path) -> Result<()> {
    let output = OutputFile::from_result(result)?;
    let json = serde_json::to_string_pretty(&output)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
