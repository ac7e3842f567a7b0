//! Playlist summary statistics
//!
//! Everything is computed over the decoded playlist, not the input set.
//! Empty denominators produce 0.0 rather than NaN.

use crate::graph::TransitionType;
use crate::models::{PlaylistStatistics, Track, Transition};

/// Summarize a decoded playlist; `None` when the playlist is empty
pub fn compute_statistics(
    total_input_tracks: usize,
    playlist: &[Track],
    transitions: &[Transition],
) -> Option<PlaylistStatistics> {
    if playlist.is_empty() {
        return None;
    }

    let harmonic_transitions = transitions.iter().filter(|t| t.is_harmonic).count();
    let non_harmonic_transitions = transitions.len() - harmonic_transitions;
    let energy_boost_transitions = transitions
        .iter()
        .filter(|t| t.transition_type == TransitionType::EnergyBoost)
        .count();

    let bpms = playlist.iter().map(Track::bpm);
    let min_bpm = bpms.clone().fold(f64::INFINITY, f64::min);
    let max_bpm = bpms.clone().fold(f64::NEG_INFINITY, f64::max);
    let avg_bpm = bpms.sum::<f64>() / playlist.len() as f64;

    Some(PlaylistStatistics {
        total_input_tracks,
        playlist_length: playlist.len(),
        coverage_pct: percentage(playlist.len(), total_input_tracks),
        harmonic_transitions,
        non_harmonic_transitions,
        energy_boost_transitions,
        harmonic_pct: percentage(harmonic_transitions, transitions.len()),
        avg_bpm,
        bpm_range: (min_bpm, max_bpm),
    })
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, key: &str, bpm: f64) -> Track {
        Track::new(id, key, bpm).unwrap()
    }

    fn transition(from: &Track, to: &Track, transition_type: TransitionType) -> Transition {
        Transition {
            from_track: from.clone(),
            to_track: to.clone(),
            quality_score: 0.5,
            transition_type,
            bpm_difference: (to.bpm() - from.bpm()).abs(),
            is_harmonic: transition_type.is_harmonic(),
        }
    }

    #[test]
    fn test_empty_playlist_has_no_statistics() {
        assert!(compute_statistics(3, &[], &[]).is_none());
    }

    #[test]
    fn test_single_track_statistics() {
        let playlist = vec![track("a", "8A", 124.0)];
        let stats = compute_statistics(4, &playlist, &[]).unwrap();
        assert_eq!(stats.playlist_length, 1);
        assert_eq!(stats.coverage_pct, 25.0);
        assert_eq!(stats.harmonic_pct, 0.0);
        assert_eq!(stats.avg_bpm, 124.0);
        assert_eq!(stats.bpm_range, (124.0, 124.0));
    }

    #[test]
    fn test_energy_boost_counts_as_harmonic() {
        let a = track("a", "5A", 120.0);
        let b = track("b", "7A", 122.0);
        let c = track("c", "1B", 126.0);
        let d = track("d", "1B", 128.0);
        let transitions = vec![
            transition(&a, &b, TransitionType::EnergyBoost),
            transition(&b, &c, TransitionType::ToleratedClash),
            transition(&c, &d, TransitionType::Harmonic),
        ];
        let playlist = vec![a, b, c, d];
        let stats = compute_statistics(4, &playlist, &transitions).unwrap();

        assert_eq!(stats.harmonic_transitions, 2);
        assert_eq!(stats.non_harmonic_transitions, 1);
        assert_eq!(stats.energy_boost_transitions, 1);
        assert!((stats.harmonic_pct - 66.666).abs() < 0.01);
        assert_eq!(stats.coverage_pct, 100.0);
        assert_eq!(stats.avg_bpm, 124.0);
        assert_eq!(stats.bpm_range, (120.0, 128.0));
    }
}
