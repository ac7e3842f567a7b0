//! Playlist optimizer: encode the transition graph as a path model, solve, decode
//!
//! Variables per track `k`: `visit_k`, `start_k`, `end_k`. One `arc_i_j`
//! variable per graph edge. Degree equalities tie them together:
//!
//! ```text
//! Σ in-arcs(k)  + start_k - visit_k = 0
//! Σ out-arcs(k) + end_k   - visit_k = 0
//! Σ start = 1,  Σ end = 1,  Σ visit >= 2 (when two or more tracks)
//! ```
//!
//! The path constraint forbids sub-cycles. Budgets:
//!
//! ```text
//! Σ energy-boost arcs <= max_energy_boosts
//! 10000·Σ clash arcs - P·Σ visit <= -P        (P = round(10000·max_violation_pct))
//! ```
//!
//! The second line is `clashes <= floor(max_violation_pct × (length - 1))`
//! because the clash count is an integer.

use crate::config::OptimizerConfig;
use crate::graph::{TransitionGraph, TransitionType};
use crate::models::{validate_tracks, PlaylistResult, Track, Transition};
use crate::solver::{
    LinearExpr, Model, PathArc, PathBranchAndBound, PathConstraint, Solution, Solver, VarId,
};
use crate::statistics::compute_statistics;
use crate::{Error, Result};
use tracing::{debug, info};

/// Fixed-point scale for quality scores and the length weight
pub const SCORE_SCALE: f64 = 1000.0;

/// Fixed-point scale for the violation fraction
pub const BUDGET_SCALE: i64 = 10_000;

/// A graph encoded as a [`Model`], with the lookups needed to decode it
#[derive(Debug, Clone)]
pub struct Formulation {
    pub model: Model,
    /// Arc `i` carries graph edge `i`
    path: PathConstraint,
}

impl Formulation {
    pub fn build(graph: &TransitionGraph, config: &OptimizerConfig) -> Self {
        let n = graph.node_count();
        let mut model = Model::new();

        let nodes: Vec<_> = (0..n).map(|k| model.new_bool_var(format!("visit_{}", k))).collect();
        let starts: Vec<_> = (0..n).map(|k| model.new_bool_var(format!("start_{}", k))).collect();
        let ends: Vec<_> = (0..n).map(|k| model.new_bool_var(format!("end_{}", k))).collect();

        let arcs: Vec<PathArc> = graph
            .edges()
            .iter()
            .map(|edge| PathArc {
                tail: edge.from,
                head: edge.to,
                literal: model.new_bool_var(format!("arc_{}_{}", edge.from, edge.to)),
            })
            .collect();

        // Degree equalities
        let mut in_expr: Vec<LinearExpr> = (0..n)
            .map(|k| LinearExpr::new().term(starts[k], 1).term(nodes[k], -1))
            .collect();
        let mut out_expr: Vec<LinearExpr> = (0..n)
            .map(|k| LinearExpr::new().term(ends[k], 1).term(nodes[k], -1))
            .collect();
        for arc in &arcs {
            in_expr[arc.head].add_term(arc.literal, 1);
            out_expr[arc.tail].add_term(arc.literal, 1);
        }
        for (k, expr) in in_expr.into_iter().enumerate() {
            model.add_eq(format!("in_degree_{}", k), expr, 0);
        }
        for (k, expr) in out_expr.into_iter().enumerate() {
            model.add_eq(format!("out_degree_{}", k), expr, 0);
        }

        model.add_eq("one_start", LinearExpr::sum(starts.iter().copied()), 1);
        model.add_eq("one_end", LinearExpr::sum(ends.iter().copied()), 1);
        if n >= 2 {
            model.add_ge("min_length", LinearExpr::sum(nodes.iter().copied()), 2);
        }

        let of_type = |t: TransitionType| -> Vec<VarId> {
            arcs.iter()
                .zip(graph.edges())
                .filter(|(_, edge)| edge.transition_type == t)
                .map(|(arc, _)| arc.literal)
                .collect()
        };

        let boosts = of_type(TransitionType::EnergyBoost);
        if !boosts.is_empty() {
            model.add_le(
                "energy_boost_budget",
                LinearExpr::sum(boosts),
                i64::from(config.max_energy_boosts),
            );
        }

        let clashes = of_type(TransitionType::ToleratedClash);
        if !clashes.is_empty() {
            let per_length = (config.max_violation_pct * BUDGET_SCALE as f64).round() as i64;
            let mut expr = LinearExpr::new();
            for literal in clashes {
                expr.add_term(literal, BUDGET_SCALE);
            }
            for &node in &nodes {
                expr.add_term(node, -per_length);
            }
            model.add_le("violation_budget", expr, -per_length);
        }

        let mut objective = LinearExpr::new();
        let length_weight = scaled(config.transition_quality_weight);
        for &node in &nodes {
            objective.add_term(node, length_weight);
        }
        for (arc, edge) in arcs.iter().zip(graph.edges()) {
            objective.add_term(arc.literal, scaled(edge.quality_score));
        }
        model.maximize(objective);

        let path = PathConstraint {
            nodes,
            starts,
            ends,
            arcs,
        };
        model.add_path(path.clone());

        Self { model, path }
    }

    /// Follow the start literal along chosen arcs; returns track indices in order
    pub fn decode(&self, solution: &Solution) -> Result<Vec<usize>> {
        let n = self.path.nodes.len();
        let Some(start) = (0..n).find(|&k| solution.value(self.path.starts[k])) else {
            return Ok(Vec::new());
        };

        let mut successor: Vec<Option<usize>> = vec![None; n];
        for arc in self.path.arcs.iter().filter(|a| solution.value(a.literal)) {
            successor[arc.tail] = Some(arc.head);
        }

        let mut order = vec![start];
        let mut current = start;
        while let Some(next) = successor[current] {
            if order.len() >= n || order.contains(&next) {
                return Err(Error::Solver("solution arcs contain a cycle".to_string()));
            }
            order.push(next);
            current = next;
        }

        let selected = self.path.nodes.iter().filter(|v| solution.value(**v)).count();
        if order.len() != selected {
            return Err(Error::Solver(format!(
                "decoded path visits {} tracks but {} are selected",
                order.len(),
                selected
            )));
        }
        Ok(order)
    }
}

fn scaled(value: f64) -> i64 {
    (value * SCORE_SCALE).round() as i64
}

/// Harmonic playlist optimizer
///
/// Holds configuration only; every `optimize` call is independent and the
/// optimizer may be shared across threads.
#[derive(Debug, Clone)]
pub struct PlaylistOptimizer<S: Solver = PathBranchAndBound> {
    config: OptimizerConfig,
    solver: S,
}

impl PlaylistOptimizer<PathBranchAndBound> {
    /// Optimizer using the bundled branch-and-bound engine
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        Self::with_solver(config, PathBranchAndBound)
    }
}

impl<S: Solver> PlaylistOptimizer<S> {
    pub fn with_solver(config: OptimizerConfig, solver: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, solver })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Order `tracks` into the best playlist found within the time limit
    ///
    /// Blocks until the solver proves optimality or the time limit elapses.
    /// INFEASIBLE and TIMEOUT_NO_SOLUTION come back as `Ok` with an empty
    /// playlist; use [`PlaylistResult::ensure_playlist`] to turn them into errors.
    pub fn optimize(&self, tracks: &[Track]) -> Result<PlaylistResult> {
        validate_tracks(tracks)?;

        let graph = TransitionGraph::build(tracks, &self.config.graph_params());
        let formulation = Formulation::build(&graph, &self.config);

        info!(
            tracks = tracks.len(),
            edges = graph.edges().len(),
            clash_edges = graph.count_by_type(TransitionType::ToleratedClash),
            boost_edges = graph.count_by_type(TransitionType::EnergyBoost),
            solver = self.solver.name(),
            time_limit_s = self.config.time_limit_seconds,
            "Optimizing playlist"
        );

        let outcome = self.solver.solve(&formulation.model, &self.config.solve_params())?;
        let solver_time_seconds = outcome.elapsed.as_secs_f64();

        info!(
            status = %outcome.status,
            elapsed_s = solver_time_seconds,
            branches = outcome.branches,
            "Solver finished"
        );

        let solution = match outcome.solution {
            Some(solution) if outcome.status.has_solution() => solution,
            _ => return Ok(PlaylistResult::empty(outcome.status, solver_time_seconds)),
        };
        debug!(
            objective = solution.objective(),
            chosen = ?solution.true_vars(&formulation.model).collect::<Vec<_>>(),
            "Decoding solution"
        );

        let order = formulation.decode(&solution)?;
        let playlist: Vec<Track> = order.iter().map(|&k| tracks[k].clone()).collect();
        let transitions = order
            .windows(2)
            .map(|pair| {
                let edge = graph.edge(pair[0], pair[1]).ok_or_else(|| {
                    Error::Solver(format!("solution uses missing edge {} -> {}", pair[0], pair[1]))
                })?;
                Ok(Transition {
                    from_track: tracks[edge.from].clone(),
                    to_track: tracks[edge.to].clone(),
                    quality_score: edge.quality_score,
                    transition_type: edge.transition_type,
                    bpm_difference: edge.bpm_difference,
                    is_harmonic: edge.transition_type.is_harmonic(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let statistics = compute_statistics(tracks.len(), &playlist, &transitions);
        Ok(PlaylistResult {
            playlist,
            transitions,
            statistics,
            solver_status: outcome.status,
            solver_time_seconds,
        })
    }
}
