//! End-to-end optimizer scenarios
//!
//! Covers:
//! - Strict level without energy boosts (scenario A)
//! - Energy boosts unlocking an extra track (scenario B)
//! - Single-track and infeasible inputs (scenarios C, D)
//! - Half/double-time tempo matching (scenario E)
//! - Result invariants over generated track sets
//!
//! All runs use one worker so results are reproducible.

use djkr8_common::bpm::bpm_compatible;
use djkr8_common::{
    Error, HarmonicLevel, OptimizerConfig, PlaylistOptimizer, PlaylistResult, SolverStatus, Track,
    TransitionType,
};
use std::collections::HashSet;

fn config() -> OptimizerConfig {
    OptimizerConfig {
        time_limit_seconds: 20.0,
        num_workers: 1,
        ..Default::default()
    }
}

fn scenario_tracks() -> Vec<Track> {
    let keys = ["5A", "6A", "7A", "8A", "12A", "7A"];
    let bpms = [120.0, 122.0, 124.0, 126.0, 128.0, 130.0];
    keys.iter()
        .zip(bpms)
        .enumerate()
        .map(|(i, (key, bpm))| Track::new(format!("track_{}", i + 1), key, bpm).unwrap())
        .collect()
}

fn assert_invariants(result: &PlaylistResult, config: &OptimizerConfig, input: usize) {
    let expected_transitions = result.playlist.len().saturating_sub(1);
    assert_eq!(result.transitions.len(), expected_transitions);

    let ids: HashSet<&str> = result.playlist.iter().map(Track::id).collect();
    assert_eq!(ids.len(), result.playlist.len(), "duplicate track in playlist");

    for (pair, transition) in result.playlist.windows(2).zip(&result.transitions) {
        assert_eq!(transition.from_track.id(), pair[0].id());
        assert_eq!(transition.to_track.id(), pair[1].id());
        assert!((0.0..=1.0).contains(&transition.quality_score));
    }

    assert!(result.energy_boost_count() <= config.max_energy_boosts as usize);
    let clash_budget = (config.max_violation_pct * result.transitions.len() as f64 + 1e-9).floor() as usize;
    assert!(result.clash_count() <= clash_budget);

    if let Some(stats) = &result.statistics {
        assert!((0.0..=100.0).contains(&stats.coverage_pct));
        assert_eq!(stats.coverage_pct == 100.0, result.playlist.len() == input);
        assert_eq!(stats.harmonic_transitions + stats.non_harmonic_transitions, result.transitions.len());
    }
}

#[test]
fn test_scenario_a_strict_without_boosts() {
    let cfg = OptimizerConfig {
        harmonic_level: HarmonicLevel::Strict,
        max_energy_boosts: 0,
        ..config()
    };
    let tracks = scenario_tracks();
    let result = PlaylistOptimizer::new(cfg.clone()).unwrap().optimize(&tracks).unwrap();

    assert_eq!(result.solver_status, SolverStatus::Optimal);
    assert_invariants(&result, &cfg, tracks.len());
    assert_eq!(result.playlist.len(), 5);
    assert!(result.playlist.iter().all(|t| t.key().to_string() != "12A"));
    assert!(result
        .transitions
        .iter()
        .all(|t| t.transition_type == TransitionType::Harmonic));
}

#[test]
fn test_scenario_b_boosts_reach_extra_track() {
    let strict = OptimizerConfig {
        max_energy_boosts: 0,
        ..config()
    };
    let boosted = OptimizerConfig {
        max_energy_boosts: 2,
        ..config()
    };
    let tracks = scenario_tracks();

    let without = PlaylistOptimizer::new(strict).unwrap().optimize(&tracks).unwrap();
    let with = PlaylistOptimizer::new(boosted.clone()).unwrap().optimize(&tracks).unwrap();

    assert_invariants(&with, &boosted, tracks.len());
    assert_eq!(with.solver_status, SolverStatus::Optimal);
    assert!(with.playlist.len() > without.playlist.len());
    assert!(with.playlist.iter().any(|t| t.key().to_string() == "12A"));
    assert!((1..=2).contains(&with.energy_boost_count()));

    let stats = with.statistics.as_ref().unwrap();
    assert_eq!(stats.coverage_pct, 100.0);
    assert_eq!(stats.energy_boost_transitions, with.energy_boost_count());
}

#[test]
fn test_scenario_c_single_track() {
    let tracks = vec![Track::new("solo", "8A", 124.0).unwrap()];
    let result = PlaylistOptimizer::new(config()).unwrap().optimize(&tracks).unwrap();

    assert_eq!(result.solver_status, SolverStatus::Optimal);
    assert_eq!(result.playlist.len(), 1);
    assert!(result.transitions.is_empty());
    let stats = result.statistics.unwrap();
    assert_eq!(stats.coverage_pct, 100.0);
    assert_eq!(stats.harmonic_pct, 0.0);
}

#[test]
fn test_scenario_d_no_edge_is_infeasible() {
    let cfg = OptimizerConfig {
        allow_halftime_bpm: false,
        ..config()
    };
    let tracks = vec![
        Track::new("low", "8A", 90.0).unwrap(),
        Track::new("high", "2B", 140.0).unwrap(),
    ];
    let result = PlaylistOptimizer::new(cfg).unwrap().optimize(&tracks).unwrap();

    assert_eq!(result.solver_status, SolverStatus::Infeasible);
    assert!(result.playlist.is_empty());
    assert!(result.transitions.is_empty());
    assert!(result.statistics.is_none());
    assert!(matches!(result.ensure_playlist(), Err(Error::NoFeasibleSolution(_))));
}

#[test]
fn test_scenario_e_halftime_matching() {
    assert!(bpm_compatible(120.0, 240.0, 10.0, true));
    assert!(!bpm_compatible(120.0, 240.0, 10.0, false));

    let tracks = vec![
        Track::new("half", "8A", 120.0).unwrap(),
        Track::new("full", "8A", 240.0).unwrap(),
    ];
    let result = PlaylistOptimizer::new(config()).unwrap().optimize(&tracks).unwrap();
    assert_eq!(result.playlist.len(), 2);
    assert_eq!(result.transitions[0].bpm_difference, 120.0);

    let no_halftime = OptimizerConfig {
        allow_halftime_bpm: false,
        ..config()
    };
    let result = PlaylistOptimizer::new(no_halftime).unwrap().optimize(&tracks).unwrap();
    assert_eq!(result.solver_status, SolverStatus::Infeasible);
}

#[test]
fn test_duplicate_ids_rejected_before_solving() {
    let tracks = vec![
        Track::new("same", "8A", 124.0).unwrap(),
        Track::new("same", "9A", 124.0).unwrap(),
    ];
    let result = PlaylistOptimizer::new(config()).unwrap().optimize(&tracks);
    assert!(matches!(result, Err(Error::InvalidTrackData(_))));
}

#[test]
fn test_clash_budget_lets_clash_through() {
    // 8A -> 8A -> 9A -> 2B: the last hop is a clash, allowed once 3 transitions × 0.34 >= 1
    let tracks = vec![
        Track::new("a", "8A", 124.0).unwrap(),
        Track::new("b", "8A", 124.0).unwrap(),
        Track::new("c", "9A", 124.0).unwrap(),
        Track::new("d", "2B", 124.0).unwrap(),
    ];
    let tight = OptimizerConfig {
        max_violation_pct: 0.0,
        ..config()
    };
    let loose = OptimizerConfig {
        max_violation_pct: 0.34,
        ..config()
    };

    let result = PlaylistOptimizer::new(tight.clone()).unwrap().optimize(&tracks).unwrap();
    assert_invariants(&result, &tight, tracks.len());
    assert_eq!(result.playlist.len(), 3);
    assert_eq!(result.clash_count(), 0);

    let result = PlaylistOptimizer::new(loose.clone()).unwrap().optimize(&tracks).unwrap();
    assert_invariants(&result, &loose, tracks.len());
    assert_eq!(result.playlist.len(), 4);
    assert_eq!(result.clash_count(), 1);
}

#[test]
fn test_invariants_on_generated_sets() {
    const KEYS: [&str; 24] = [
        "1A", "2A", "3A", "4A", "5A", "6A", "7A", "8A", "9A", "10A", "11A", "12A", "1B", "2B",
        "3B", "4B", "5B", "6B", "7B", "8B", "9B", "10B", "11B", "12B",
    ];

    for seed in 1u64..=6 {
        let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let count = 5 + (next() % 4) as usize;
        let tracks: Vec<Track> = (0..count)
            .map(|i| {
                let key = KEYS[(next() % 24) as usize];
                let bpm = 118.0 + (next() % 12) as f64;
                Track::new(format!("gen_{}_{}", seed, i), key, bpm).unwrap()
            })
            .collect();

        for level in [HarmonicLevel::Strict, HarmonicLevel::Relaxed] {
            let cfg = OptimizerConfig {
                harmonic_level: level,
                max_energy_boosts: 1,
                max_violation_pct: 0.25,
                ..config()
            };
            let result = PlaylistOptimizer::new(cfg.clone()).unwrap().optimize(&tracks).unwrap();
            assert!(
                matches!(result.solver_status, SolverStatus::Optimal | SolverStatus::Infeasible),
                "seed {} level {}",
                seed,
                level
            );
            assert_invariants(&result, &cfg, tracks.len());
        }
    }
}

#[test]
fn test_single_worker_runs_are_reproducible() {
    let tracks = scenario_tracks();
    let optimizer = PlaylistOptimizer::new(OptimizerConfig {
        max_energy_boosts: 2,
        ..config()
    })
    .unwrap();

    let first = optimizer.optimize(&tracks).unwrap();
    let second = optimizer.optimize(&tracks).unwrap();
    let ids = |r: &PlaylistResult| r.playlist.iter().map(|t| t.id().to_string()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
}
