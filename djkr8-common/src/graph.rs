//! Transition graph builder
//!
//! Tracks live in an arena (the input slice) and edges refer to them by index.
//! An edge `i -> j` exists iff the tempos are compatible; key clashes stay in
//! the graph as `ToleratedClash` edges and are paid for by the violation budget
//! in the optimizer, not by edge removal.

use crate::bpm::{get_bpm_delta, get_bpm_difference, tempo_match, TempoMatch};
use crate::camelot::{HarmonicLevel, KeyRelation, RelationTable};
use crate::models::Track;
use serde::{Deserialize, Serialize};

/// Ceiling for clash scores; every accepted relation scores above it
pub const CLASH_SCORE_MAX: f64 = 0.2;

/// Largest tempo penalty applied to accepted relations
const HARMONIC_TEMPO_PENALTY: f64 = 0.2;

/// Largest tempo penalty applied to clashes
const CLASH_TEMPO_PENALTY: f64 = 0.1;

/// Tag on a feasible edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    /// Accepted by the active harmonic level
    Harmonic,
    /// Energy-boost key move; budgeted separately at every level
    EnergyBoost,
    /// Fails the harmonic test; spends the violation budget
    ToleratedClash,
}

impl TransitionType {
    /// Whether the transition counts as harmonic for statistics
    pub fn is_harmonic(self) -> bool {
        !matches!(self, TransitionType::ToleratedClash)
    }
}

/// Parameters that decide which edges exist and how they score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphParams {
    /// Percent
    pub bpm_tolerance: f64,
    pub allow_halftime_bpm: bool,
    pub harmonic_level: HarmonicLevel,
}

/// Directed edge between two track indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub transition_type: TransitionType,
    pub relation: KeyRelation,
    pub tempo_match: TempoMatch,
    pub bpm_difference: f64,
    pub quality_score: f64,
}

/// Dense, index-based compatibility graph
#[derive(Debug, Clone)]
pub struct TransitionGraph {
    node_count: usize,
    edges: Vec<Edge>,
    /// `edge_at[from * n + to]` -> position in `edges`
    edge_at: Vec<Option<usize>>,
}

impl TransitionGraph {
    /// Classify every ordered pair of distinct tracks
    pub fn build(tracks: &[Track], params: &GraphParams) -> Self {
        let n = tracks.len();
        let relations = RelationTable::new();
        let mut edges = Vec::new();
        let mut edge_at = vec![None; n * n];

        for (i, from) in tracks.iter().enumerate() {
            for (j, to) in tracks.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(tempo) = tempo_match(
                    from.bpm(),
                    to.bpm(),
                    params.bpm_tolerance,
                    params.allow_halftime_bpm,
                ) else {
                    continue;
                };

                let relation = relations.get(&from.key(), &to.key());
                let transition_type = classify(relation, params.harmonic_level);
                let bpm_difference = get_bpm_difference(from.bpm(), to.bpm());
                let gap = normalized_gap(from.bpm(), bpm_difference, params.bpm_tolerance);
                tracing::trace!(
                    from = from.id(),
                    to = to.id(),
                    bpm_delta = get_bpm_delta(from.bpm(), to.bpm()),
                    ?relation,
                    ?tempo,
                    "Transition edge"
                );

                edge_at[i * n + j] = Some(edges.len());
                edges.push(Edge {
                    from: i,
                    to: j,
                    transition_type,
                    relation,
                    tempo_match: tempo,
                    bpm_difference,
                    quality_score: quality_score(relation, transition_type, gap),
                });
            }
        }

        tracing::debug!(
            tracks = n,
            edges = edges.len(),
            level = %params.harmonic_level,
            "Built transition graph"
        );

        Self {
            node_count: n,
            edges,
            edge_at,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, from: usize, to: usize) -> Option<&Edge> {
        if from >= self.node_count || to >= self.node_count {
            return None;
        }
        self.edge_at[from * self.node_count + to].map(|idx| &self.edges[idx])
    }

    pub fn count_by_type(&self, transition_type: TransitionType) -> usize {
        self.edges
            .iter()
            .filter(|e| e.transition_type == transition_type)
            .count()
    }
}

/// Tag a tempo-compatible pair by its key relation
pub fn classify(relation: KeyRelation, level: HarmonicLevel) -> TransitionType {
    if relation == KeyRelation::EnergyBoost {
        TransitionType::EnergyBoost
    } else if level.accepts(relation) {
        TransitionType::Harmonic
    } else {
        TransitionType::ToleratedClash
    }
}

/// Direct tempo gap relative to the tolerance window, clamped to [0, 1]
///
/// Half/double-time matches usually land at 1.0 since the direct gap is large.
pub fn normalized_gap(from_bpm: f64, bpm_difference: f64, tolerance_pct: f64) -> f64 {
    let window = from_bpm * tolerance_pct / 100.0;
    if window <= 0.0 {
        return 1.0;
    }
    (bpm_difference / window).clamp(0.0, 1.0)
}

/// Edge quality in [0, 1]; monotone in relation rank and tempo gap
pub fn quality_score(relation: KeyRelation, transition_type: TransitionType, gap: f64) -> f64 {
    match transition_type {
        TransitionType::ToleratedClash => CLASH_SCORE_MAX - CLASH_TEMPO_PENALTY * gap,
        TransitionType::Harmonic | TransitionType::EnergyBoost => {
            relation.rank() - HARMONIC_TEMPO_PENALTY * gap
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(level: HarmonicLevel, halftime: bool) -> GraphParams {
        GraphParams {
            bpm_tolerance: 10.0,
            allow_halftime_bpm: halftime,
            harmonic_level: level,
        }
    }

    fn track(id: &str, key: &str, bpm: f64) -> Track {
        Track::new(id, key, bpm).unwrap()
    }

    #[test]
    fn test_no_self_edges_and_dense_edges() {
        let tracks = vec![
            track("a", "8A", 124.0),
            track("b", "8A", 124.0),
            track("c", "9A", 126.0),
        ];
        let graph = TransitionGraph::build(&tracks, &params(HarmonicLevel::Strict, true));
        assert_eq!(graph.edges().len(), 6);
        for i in 0..3 {
            assert!(graph.edge(i, i).is_none());
        }
    }

    #[test]
    fn test_clashes_are_graph_eligible() {
        let tracks = vec![track("a", "8A", 124.0), track("b", "2B", 124.0)];
        let graph = TransitionGraph::build(&tracks, &params(HarmonicLevel::Strict, true));
        let edge = graph.edge(0, 1).unwrap();
        assert_eq!(edge.transition_type, TransitionType::ToleratedClash);
        assert_eq!(edge.relation, KeyRelation::Incompatible);
        assert!(!edge.transition_type.is_harmonic());
    }

    #[test]
    fn test_tempo_incompatible_pairs_have_no_edge() {
        let tracks = vec![track("a", "8A", 90.0), track("b", "8A", 128.0)];
        let graph = TransitionGraph::build(&tracks, &params(HarmonicLevel::Relaxed, true));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_halftime_edges_follow_flag() {
        let tracks = vec![track("a", "8A", 120.0), track("b", "8A", 240.0)];
        let with = TransitionGraph::build(&tracks, &params(HarmonicLevel::Strict, true));
        let edge = with.edge(0, 1).unwrap();
        assert_eq!(edge.tempo_match, TempoMatch::HalfTime);
        assert_eq!(edge.bpm_difference, 120.0);

        let without = TransitionGraph::build(&tracks, &params(HarmonicLevel::Strict, false));
        assert!(without.edges().is_empty());
    }

    #[test]
    fn test_energy_boost_typed_at_every_level() {
        let tracks = vec![track("a", "5A", 124.0), track("b", "7A", 124.0)];
        for level in [HarmonicLevel::Strict, HarmonicLevel::Moderate, HarmonicLevel::Relaxed] {
            let graph = TransitionGraph::build(&tracks, &params(level, true));
            assert_eq!(graph.edge(0, 1).unwrap().transition_type, TransitionType::EnergyBoost);
        }
    }

    #[test]
    fn test_identical_zero_gap_scores_maximal() {
        let best = quality_score(KeyRelation::Identical, TransitionType::Harmonic, 0.0);
        assert_eq!(best, 1.0);
        for relation in [
            KeyRelation::Adjacent,
            KeyRelation::Relative,
            KeyRelation::Diagonal,
            KeyRelation::EnergyBoost,
            KeyRelation::Wide,
        ] {
            assert!(quality_score(relation, TransitionType::Harmonic, 0.0) < best);
        }
    }

    #[test]
    fn test_clash_scores_below_every_accepted_relation() {
        let worst_accepted = [
            KeyRelation::Identical,
            KeyRelation::Adjacent,
            KeyRelation::Relative,
            KeyRelation::Diagonal,
            KeyRelation::EnergyBoost,
            KeyRelation::Wide,
        ]
        .into_iter()
        .map(|r| quality_score(r, TransitionType::Harmonic, 1.0))
        .fold(f64::INFINITY, f64::min);
        let best_clash = quality_score(KeyRelation::Incompatible, TransitionType::ToleratedClash, 0.0);
        assert!(best_clash < worst_accepted);
        assert!(quality_score(KeyRelation::Incompatible, TransitionType::ToleratedClash, 1.0) > 0.0);
    }

    #[test]
    fn test_score_decreases_with_tempo_gap() {
        let near = quality_score(KeyRelation::Adjacent, TransitionType::Harmonic, 0.1);
        let far = quality_score(KeyRelation::Adjacent, TransitionType::Harmonic, 0.9);
        assert!(near > far);
    }

    #[test]
    fn test_normalized_gap_clamps() {
        assert_eq!(normalized_gap(120.0, 0.0, 10.0), 0.0);
        assert_eq!(normalized_gap(120.0, 6.0, 10.0), 0.5);
        assert_eq!(normalized_gap(120.0, 120.0, 10.0), 1.0);
    }
}
