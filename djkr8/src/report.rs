//! Console formatting for results and playlist listings

use djkr8_common::{PlaylistResult, TransitionType};
use djkr8_rekordbox::PlaylistInfo;
use std::fmt::Write;

/// Headline, solver status and statistics
pub fn format_summary(result: &PlaylistResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "✓ Found playlist with {} tracks", result.playlist.len());
    let _ = writeln!(
        out,
        "  Solver: {} ({:.2}s)",
        result.solver_status, result.solver_time_seconds
    );

    if let Some(stats) = &result.statistics {
        let total = stats.harmonic_transitions + stats.non_harmonic_transitions;
        let _ = writeln!(out, "  Coverage: {:.1}% of input tracks", stats.coverage_pct);
        let _ = writeln!(
            out,
            "  Harmonic: {}/{} transitions ({:.1}%)",
            stats.harmonic_transitions, total, stats.harmonic_pct
        );
        if stats.energy_boost_transitions > 0 {
            let _ = writeln!(out, "  Energy boosts: {}", stats.energy_boost_transitions);
        }
        let _ = writeln!(
            out,
            "  BPM range: {:.0}-{:.0} (avg: {:.1})",
            stats.bpm_range.0, stats.bpm_range.1, stats.avg_bpm
        );
    }
    out
}

/// Numbered playlist order; the transition into each track is marked
pub fn format_playlist(result: &PlaylistResult) -> String {
    let mut out = String::from("Playlist order:\n");
    for (i, track) in result.playlist.iter().enumerate() {
        let marker = match i.checked_sub(1).and_then(|t| result.transitions.get(t)) {
            Some(t) => match t.transition_type {
                TransitionType::Harmonic => "",
                TransitionType::EnergyBoost => "  ↑ boost",
                TransitionType::ToleratedClash => "  ✗ clash",
            },
            None => "",
        };
        let _ = writeln!(
            out,
            "  {:2}. {:<40} {:<4} {:6.1} BPM{}",
            i + 1,
            track.id(),
            track.key().to_string(),
            track.bpm(),
            marker
        );
    }
    out
}

pub fn format_playlists(playlists: &[PlaylistInfo]) -> String {
    if playlists.is_empty() {
        return "No playlists found\n".to_string();
    }
    let mut out = String::new();
    for p in playlists {
        let _ = writeln!(out, "  {:<50} {:>5} tracks  (id {})", p.path, p.track_count, p.id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use djkr8_common::{OptimizerConfig, PlaylistOptimizer, Track};

    fn result() -> PlaylistResult {
        let tracks = vec![
            Track::new("one", "8A", 124.0).unwrap(),
            Track::new("two", "9A", 126.0).unwrap(),
        ];
        PlaylistOptimizer::new(OptimizerConfig {
            num_workers: 1,
            ..Default::default()
        })
        .unwrap()
        .optimize(&tracks)
        .unwrap()
    }

    #[test]
    fn test_summary_mentions_status_and_coverage() {
        let summary = format_summary(&result());
        assert!(summary.contains("2 tracks"));
        assert!(summary.contains("OPTIMAL"));
        assert!(summary.contains("Coverage: 100.0%"));
        assert!(summary.contains("Harmonic: 1/1"));
    }

    #[test]
    fn test_playlist_lists_every_track() {
        let text = format_playlist(&result());
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains(" 1. "));
        assert!(text.contains(" 2. "));
    }

    #[test]
    fn test_playlists_listing() {
        assert_eq!(format_playlists(&[]), "No playlists found\n");
        let listing = format_playlists(&[PlaylistInfo {
            id: "p1".into(),
            name: "Warmup".into(),
            path: "Techno/Warmup".into(),
            track_count: 12,
        }]);
        assert!(listing.contains("Techno/Warmup"));
        assert!(listing.contains("12 tracks"));
    }
}
