//! Depth-first branch-and-bound over a model's path structure
//!
//! Branching extends the path one arc literal at a time from a chosen start
//! node. Every linear constraint is bounded by a per-node relaxation (each
//! unvisited node may still be entered once through its most favorable in-arc),
//! the objective is bounded the same way, and every incumbent is re-checked
//! exactly with [`Model::evaluate`] before it is accepted.
//!
//! Root branches (one per start node) run on a rayon pool and share the
//! incumbent objective, so every worker prunes against the best solution
//! found anywhere. A greedy dive from each start seeds the incumbent before the
//! exhaustive pass.

use super::model::{constraint_terms_by_var, Model, PathConstraint, Relation, Solution, VarId};
use super::{SolveOutcome, SolveParams, Solver};
use crate::models::SolverStatus;
use crate::{Error, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Search nodes between wall-clock checks, per worker
const TIME_CHECK_INTERVAL: u64 = 256;

/// Branch-and-bound engine for models carrying exactly one [`PathConstraint`]
#[derive(Debug, Default, Clone, Copy)]
pub struct PathBranchAndBound;

impl Solver for PathBranchAndBound {
    fn name(&self) -> &'static str {
        "path-branch-and-bound"
    }

    fn solve(&self, model: &Model, params: &SolveParams) -> Result<SolveOutcome> {
        let started = Instant::now();
        let index = SearchIndex::build(model)?;
        let shared = Shared::new(started + params.time_limit);

        let empty = vec![false; model.num_vars()];
        if let Some(objective) = model.evaluate(&empty) {
            shared.offer(model, empty, objective);
        }

        let root = RootState::new(&index);
        let order = index.start_order();
        let workers = params.effective_workers();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("djkr8-search-{}", i))
            .build()
            .map_err(|e| Error::Solver(format!("Failed to start search workers: {}", e)))?;

        tracing::debug!(
            vars = model.num_vars(),
            constraints = model.constraints().len(),
            nodes = index.node_count(),
            workers,
            "Starting branch-and-bound"
        );

        pool.install(|| {
            for mode in [Mode::Greedy, Mode::Exhaustive] {
                order.par_iter().for_each(|&start| {
                    Worker::new(model, &index, &shared, &root).search_from(start, mode);
                });
            }
        });

        let timed_out = shared.stop.load(Ordering::Acquire);
        let branches = shared.branches.load(Ordering::Relaxed);
        let solution = shared.into_solution();
        let status = match (timed_out, solution.is_some()) {
            (false, true) => SolverStatus::Optimal,
            (false, false) => SolverStatus::Infeasible,
            (true, true) => SolverStatus::Feasible,
            (true, false) => SolverStatus::TimeoutNoSolution,
        };

        Ok(SolveOutcome {
            status,
            solution,
            elapsed: started.elapsed(),
            branches,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Follow the first feasible child only
    Greedy,
    /// Visit every child the bounds allow
    Exhaustive,
}

/// Precomputed lookups shared read-only by all workers
struct SearchIndex<'m> {
    path: &'m PathConstraint,
    objective: Vec<i64>,
    terms: Vec<Vec<(usize, i64)>>,
    bounds: Vec<(Relation, i64)>,
    /// Arc indices leaving each node, best entry gain first
    out_arcs: Vec<Vec<usize>>,
    /// Per node: (constraint, most negative, most positive) change from entering it by an arc
    entry: Vec<Vec<(usize, i64, i64)>>,
    /// Per node: best objective gain from entering it by an arc, floored at 0
    entry_objective: Vec<i64>,
    end_min: Vec<i64>,
    end_max: Vec<i64>,
    end_objective: i64,
}

impl<'m> SearchIndex<'m> {
    fn build(model: &'m Model) -> Result<Self> {
        let path = match model.paths() {
            [path] => path,
            [] => return Err(Error::Solver("model has no path constraint to branch on".to_string())),
            _ => return Err(Error::Solver("only one path constraint per model is supported".to_string())),
        };
        let n = path.nodes.len();
        if path.starts.len() != n || path.ends.len() != n {
            return Err(Error::Solver(
                "path constraint needs one start and one end literal per node".to_string(),
            ));
        }

        let mut claimed = vec![false; model.num_vars()];
        let mut claim = |var: VarId| -> Result<()> {
            let slot = claimed
                .get_mut(var.index())
                .ok_or_else(|| Error::Solver(format!("unknown variable index {}", var.index())))?;
            if *slot {
                return Err(Error::Solver(format!(
                    "variable '{}' appears twice in the path structure",
                    model.var_name(var)
                )));
            }
            *slot = true;
            Ok(())
        };
        for k in 0..n {
            claim(path.nodes[k])?;
            claim(path.starts[k])?;
            claim(path.ends[k])?;
        }
        let mut in_arcs: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut out_arcs: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (a, arc) in path.arcs.iter().enumerate() {
            if arc.tail >= n || arc.head >= n || arc.tail == arc.head {
                return Err(Error::Solver(format!(
                    "arc '{}' has invalid endpoints {} -> {}",
                    model.var_name(arc.literal),
                    arc.tail,
                    arc.head
                )));
            }
            claim(arc.literal)?;
            in_arcs[arc.head].push(a);
            out_arcs[arc.tail].push(a);
        }
        if let Some(free) = claimed.iter().position(|c| !c) {
            return Err(Error::Solver(format!(
                "variable '{}' is not part of the path structure",
                model.var_name(VarId::from_index(free))
            )));
        }

        let objective = model.objective_coefficients();
        let terms = constraint_terms_by_var(model);
        let bounds = model
            .constraints()
            .iter()
            .map(|c| (c.relation, c.rhs))
            .collect::<Vec<_>>();

        let mut entry = Vec::with_capacity(n);
        let mut entry_objective = Vec::with_capacity(n);
        for k in 0..n {
            if in_arcs[k].is_empty() {
                entry.push(Vec::new());
                entry_objective.push(0);
                continue;
            }
            let node_var = path.nodes[k];

            let best_arc = in_arcs[k]
                .iter()
                .map(|&a| objective[path.arcs[a].literal.index()])
                .max()
                .unwrap_or(0);
            entry_objective.push((objective[node_var.index()] + best_arc).max(0));

            // constraint -> (node coefficient, coefficients of in-arcs present)
            let mut per_constraint: HashMap<usize, (i64, Vec<i64>)> = HashMap::new();
            for &(c, coef) in &terms[node_var.index()] {
                per_constraint.entry(c).or_default().0 += coef;
            }
            for &a in &in_arcs[k] {
                for &(c, coef) in &terms[path.arcs[a].literal.index()] {
                    per_constraint.entry(c).or_default().1.push(coef);
                }
            }
            let mut contributions: Vec<(usize, i64, i64)> = per_constraint
                .into_iter()
                .filter_map(|(c, (node_coef, arc_coefs))| {
                    let absent = arc_coefs.len() < in_arcs[k].len();
                    let floor = if absent { Some(0) } else { None };
                    let min_arc = arc_coefs.iter().copied().chain(floor).min().unwrap_or(0);
                    let max_arc = arc_coefs.iter().copied().chain(floor).max().unwrap_or(0);
                    let low = (node_coef + min_arc).min(0);
                    let high = (node_coef + max_arc).max(0);
                    (low != 0 || high != 0).then_some((c, low, high))
                })
                .collect();
            contributions.sort_unstable_by_key(|(c, _, _)| *c);
            entry.push(contributions);
        }

        let mut end_min = vec![0i64; bounds.len()];
        let mut end_max = vec![0i64; bounds.len()];
        for end in &path.ends {
            for &(c, coef) in &terms[end.index()] {
                end_min[c] = end_min[c].min(coef);
                end_max[c] = end_max[c].max(coef);
            }
        }
        let end_objective = path
            .ends
            .iter()
            .map(|e| objective[e.index()])
            .max()
            .unwrap_or(0)
            .max(0);

        for arcs in out_arcs.iter_mut() {
            arcs.sort_by_key(|&a| {
                let arc = &path.arcs[a];
                let gain = objective[arc.literal.index()] + objective[path.nodes[arc.head].index()];
                (std::cmp::Reverse(gain), arc.head)
            });
        }

        Ok(Self {
            path,
            objective,
            terms,
            bounds,
            out_arcs,
            entry,
            entry_objective,
            end_min,
            end_max,
            end_objective,
        })
    }

    fn node_count(&self) -> usize {
        self.path.nodes.len()
    }

    /// Start nodes, most promising first
    fn start_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.node_count()).collect();
        order.sort_by_key(|&k| {
            let root = self.objective[self.path.starts[k].index()]
                + self.objective[self.path.nodes[k].index()];
            let best_next = self.out_arcs[k]
                .first()
                .map(|&a| {
                    let arc = &self.path.arcs[a];
                    self.objective[arc.literal.index()] + self.objective[self.path.nodes[arc.head].index()]
                })
                .unwrap_or(0);
            (std::cmp::Reverse(root + best_next), k)
        });
        order
    }

    fn satisfies_bound(&self, c: usize, low: i64, high: i64) -> bool {
        let (relation, rhs) = self.bounds[c];
        match relation {
            Relation::LessOrEqual => low <= rhs,
            Relation::GreaterOrEqual => high >= rhs,
            Relation::Equal => low <= rhs && high >= rhs,
        }
    }
}

/// Constraint activity and relaxation sums with nothing chosen
struct RootState {
    rem_min: Vec<i64>,
    rem_max: Vec<i64>,
    rem_objective: i64,
}

impl RootState {
    fn new(index: &SearchIndex<'_>) -> Self {
        let mut rem_min = vec![0i64; index.bounds.len()];
        let mut rem_max = vec![0i64; index.bounds.len()];
        for contributions in &index.entry {
            for &(c, low, high) in contributions {
                rem_min[c] += low;
                rem_max[c] += high;
            }
        }
        Self {
            rem_min,
            rem_max,
            rem_objective: index.entry_objective.iter().sum(),
        }
    }
}

/// Incumbent and stop flag shared across workers
struct Shared {
    deadline: Instant,
    stop: AtomicBool,
    best: AtomicI64,
    incumbent: Mutex<Option<Solution>>,
    branches: AtomicU64,
}

impl Shared {
    fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            stop: AtomicBool::new(false),
            best: AtomicI64::new(i64::MIN),
            incumbent: Mutex::new(None),
            branches: AtomicU64::new(0),
        }
    }

    fn best(&self) -> i64 {
        self.best.load(Ordering::Acquire)
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn check_deadline(&self) -> bool {
        if Instant::now() >= self.deadline {
            self.stop.store(true, Ordering::Release);
        }
        self.stopped()
    }

    /// Accept a candidate if it beats the incumbent and passes the exact check
    fn offer(&self, model: &Model, values: Vec<bool>, objective: i64) {
        let mut incumbent = self.incumbent.lock().unwrap_or_else(PoisonError::into_inner);
        if objective <= self.best() {
            return;
        }
        match model.evaluate(&values) {
            Some(exact) if exact == objective => {
                self.best.store(objective, Ordering::Release);
                *incumbent = Some(Solution::new(values, objective));
                tracing::trace!(objective, "New incumbent");
            }
            _ => {
                tracing::error!(
                    objective,
                    violated = ?model.violated_constraints(&values),
                    "Discarding candidate that fails the exact model check"
                );
            }
        }
    }

    fn into_solution(self) -> Option<Solution> {
        self.incumbent
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mutable search state for one root branch
struct Worker<'a> {
    model: &'a Model,
    index: &'a SearchIndex<'a>,
    shared: &'a Shared,
    activity: Vec<i64>,
    rem_min: Vec<i64>,
    rem_max: Vec<i64>,
    rem_objective: i64,
    objective: i64,
    visited: Vec<bool>,
    chosen: Vec<VarId>,
    branches: u64,
}

impl<'a> Worker<'a> {
    fn new(model: &'a Model, index: &'a SearchIndex<'a>, shared: &'a Shared, root: &RootState) -> Self {
        Self {
            model,
            index,
            shared,
            activity: vec![0; index.bounds.len()],
            rem_min: root.rem_min.clone(),
            rem_max: root.rem_max.clone(),
            rem_objective: root.rem_objective,
            objective: 0,
            visited: vec![false; index.node_count()],
            chosen: Vec::with_capacity(2 * index.node_count() + 1),
            branches: 0,
        }
    }

    fn search_from(mut self, start: usize, mode: Mode) {
        if self.shared.stopped() {
            return;
        }
        let path = self.index.path;
        self.set_var(path.starts[start], 1);
        self.set_var(path.nodes[start], 1);
        self.set_visited(start, 1);

        let feasible = (0..self.index.bounds.len()).all(|c| self.bound_ok(c));
        if feasible {
            self.dfs(start, mode);
        }
        self.shared.branches.fetch_add(self.branches, Ordering::Relaxed);
    }

    fn dfs(&mut self, current: usize, mode: Mode) {
        self.branches += 1;
        if self.branches % TIME_CHECK_INTERVAL == 0 && self.shared.check_deadline() {
            return;
        }
        if self.shared.stopped() {
            return;
        }

        self.try_end(current);

        let index = self.index;
        for &a in &index.out_arcs[current] {
            let arc = index.path.arcs[a];
            if self.visited[arc.head] {
                continue;
            }
            if self.shared.stopped() {
                return;
            }
            let node_var = index.path.nodes[arc.head];
            let gain = index.objective[arc.literal.index()] + index.objective[node_var.index()];
            let upper = self.objective
                + gain
                + (self.rem_objective - index.entry_objective[arc.head])
                + index.end_objective;
            if upper <= self.shared.best() {
                continue;
            }

            self.set_var(arc.literal, 1);
            self.set_var(node_var, 1);
            self.set_visited(arc.head, 1);

            let feasible = self.changed_bounds_ok(arc.literal, node_var, arc.head);
            if feasible {
                self.dfs(arc.head, mode);
            }

            self.set_visited(arc.head, -1);
            self.set_var(node_var, -1);
            self.set_var(arc.literal, -1);

            if feasible && mode == Mode::Greedy {
                return;
            }
        }
    }

    /// Close the path at `current` and offer it if it is better and exactly feasible
    fn try_end(&mut self, current: usize) {
        let end = self.index.path.ends[current];
        let objective = self.objective + self.index.objective[end.index()];
        if objective <= self.shared.best() {
            return;
        }

        self.set_var(end, 1);
        let feasible = self
            .index
            .bounds
            .iter()
            .enumerate()
            .all(|(c, (relation, rhs))| relation.holds(self.activity[c], *rhs));
        let values = feasible.then(|| self.assignment());
        self.set_var(end, -1);

        if let Some(values) = values {
            self.shared.offer(self.model, values, objective);
        }
    }

    fn assignment(&self) -> Vec<bool> {
        let mut values = vec![false; self.model.num_vars()];
        for var in &self.chosen {
            values[var.index()] = true;
        }
        values
    }

    /// `sign` is +1 to choose the variable, -1 to undo
    fn set_var(&mut self, var: VarId, sign: i64) {
        for &(c, coef) in &self.index.terms[var.index()] {
            self.activity[c] += sign * coef;
        }
        self.objective += sign * self.index.objective[var.index()];
        if sign > 0 {
            self.chosen.push(var);
        } else {
            self.chosen.pop();
        }
    }

    fn set_visited(&mut self, node: usize, sign: i64) {
        for &(c, low, high) in &self.index.entry[node] {
            self.rem_min[c] -= sign * low;
            self.rem_max[c] -= sign * high;
        }
        self.rem_objective -= sign * self.index.entry_objective[node];
        self.visited[node] = sign > 0;
    }

    fn bound_ok(&self, c: usize) -> bool {
        let low = self.activity[c] + self.rem_min[c] + self.index.end_min[c];
        let high = self.activity[c] + self.rem_max[c] + self.index.end_max[c];
        self.index.satisfies_bound(c, low, high)
    }

    /// Only constraints touched by the last move can have changed status
    fn changed_bounds_ok(&self, arc: VarId, node_var: VarId, node: usize) -> bool {
        let index = self.index;
        index.terms[arc.index()]
            .iter()
            .chain(index.terms[node_var.index()].iter())
            .all(|&(c, _)| self.bound_ok(c))
            && index.entry[node].iter().all(|&(c, _, _)| self.bound_ok(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::model::{LinearExpr, PathArc};
    use std::time::Duration;

    struct TestGraph {
        model: Model,
        path: PathConstraint,
    }

    /// Path model over `n` nodes with weighted nodes and arcs.
    /// Arcs flagged `budgeted` share an at-most-`budget` constraint.
    fn build(n: usize, node_weight: i64, arcs: &[(usize, usize, i64, bool)], budget: i64, require_start: bool) -> TestGraph {
        let mut model = Model::new();
        let nodes: Vec<VarId> = (0..n).map(|k| model.new_bool_var(format!("node{}", k))).collect();
        let starts: Vec<VarId> = (0..n).map(|k| model.new_bool_var(format!("start{}", k))).collect();
        let ends: Vec<VarId> = (0..n).map(|k| model.new_bool_var(format!("end{}", k))).collect();
        let path_arcs: Vec<PathArc> = arcs
            .iter()
            .map(|&(tail, head, _, _)| PathArc {
                tail,
                head,
                literal: model.new_bool_var(format!("arc{}_{}", tail, head)),
            })
            .collect();

        let mut objective = LinearExpr::new();
        for &node in &nodes {
            objective.add_term(node, node_weight);
        }
        let mut budgeted = LinearExpr::new();
        for (arc, &(_, _, weight, is_budgeted)) in path_arcs.iter().zip(arcs) {
            objective.add_term(arc.literal, weight);
            if is_budgeted {
                budgeted.add_term(arc.literal, 1);
            }
        }
        model.maximize(objective);
        model.add_le("budget", budgeted, budget);
        if require_start {
            model.add_eq("one_start", LinearExpr::sum(starts.iter().copied()), 1);
        }

        let path = PathConstraint { nodes, starts, ends, arcs: path_arcs };
        model.add_path(path.clone());
        TestGraph { model, path }
    }

    /// Best objective over every simple path (and the empty path)
    fn brute_force(graph: &TestGraph) -> Option<i64> {
        let n = graph.path.nodes.len();
        let mut best = graph.model.evaluate(&vec![false; graph.model.num_vars()]);

        fn extend(graph: &TestGraph, sequence: &mut Vec<usize>, best: &mut Option<i64>) {
            let path = &graph.path;
            let mut values = vec![false; graph.model.num_vars()];
            values[path.starts[sequence[0]].index()] = true;
            values[path.ends[*sequence.last().unwrap()].index()] = true;
            for &k in sequence.iter() {
                values[path.nodes[k].index()] = true;
            }
            for pair in sequence.windows(2) {
                let arc = path.arcs.iter().find(|a| a.tail == pair[0] && a.head == pair[1]).unwrap();
                values[arc.literal.index()] = true;
            }
            if let Some(objective) = graph.model.evaluate(&values) {
                if best.map_or(true, |b| objective > b) {
                    *best = Some(objective);
                }
            }

            let last = *sequence.last().unwrap();
            let nexts: Vec<usize> = path
                .arcs
                .iter()
                .filter(|a| a.tail == last && !sequence.contains(&a.head))
                .map(|a| a.head)
                .collect();
            for next in nexts {
                sequence.push(next);
                extend(graph, sequence, best);
                sequence.pop();
            }
        }

        for start in 0..n {
            extend(graph, &mut vec![start], &mut best);
        }
        best
    }

    /// xorshift, enough for reproducible test graphs
    fn next(state: &mut u64) -> u64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        *state
    }

    fn random_graph(n: usize, seed: u64, density_pct: u64) -> Vec<(usize, usize, i64, bool)> {
        let mut state = seed;
        let mut arcs = Vec::new();
        for tail in 0..n {
            for head in 0..n {
                if tail != head && next(&mut state) % 100 < density_pct {
                    let weight = (next(&mut state) % 1000) as i64;
                    let budgeted = next(&mut state) % 4 == 0;
                    arcs.push((tail, head, weight, budgeted));
                }
            }
        }
        arcs
    }

    fn params() -> SolveParams {
        SolveParams::new(Duration::from_secs(30)).with_workers(2)
    }

    #[test]
    fn test_matches_brute_force_on_small_graphs() {
        for seed in 1..=12u64 {
            let n = 4 + (seed as usize % 3);
            let arcs = random_graph(n, seed * 7919, 55);
            let graph = build(n, 300, &arcs, (seed % 2) as i64, false);

            let outcome = PathBranchAndBound.solve(&graph.model, &params()).unwrap();
            assert_eq!(outcome.status, SolverStatus::Optimal, "seed {}", seed);
            let solution = outcome.solution.unwrap();
            assert_eq!(Some(solution.objective()), brute_force(&graph), "seed {}", seed);
            assert_eq!(graph.model.evaluate(solution.values()), Some(solution.objective()));
        }
    }

    #[test]
    fn test_follows_heaviest_chain() {
        // 0 -> 1 -> 2 is the only way to visit all three
        let arcs = [(0, 1, 100, false), (1, 2, 100, false), (2, 0, 10, false)];
        let graph = build(3, 1000, &arcs, 0, true);
        let outcome = PathBranchAndBound.solve(&graph.model, &params()).unwrap();
        let solution = outcome.solution.unwrap();
        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert_eq!(solution.objective(), 3200);
        assert!(solution.value(graph.path.starts[0]));
        assert!(solution.value(graph.path.ends[2]));
    }

    #[test]
    fn test_budget_limits_arc_choice() {
        // Only the budgeted arc joins the two nodes
        let arcs = [(0, 1, 500, true)];
        let graph = build(2, 1000, &arcs, 0, true);
        let outcome = PathBranchAndBound.solve(&graph.model, &params()).unwrap();
        assert_eq!(outcome.solution.unwrap().objective(), 1000);

        let graph = build(2, 1000, &arcs, 1, true);
        let outcome = PathBranchAndBound.solve(&graph.model, &params()).unwrap();
        assert_eq!(outcome.solution.unwrap().objective(), 2500);
    }

    #[test]
    fn test_reports_infeasible_after_full_search() {
        let mut graph = build(2, 1000, &[], 0, true);
        graph
            .model
            .add_ge("min_length", LinearExpr::sum(graph.path.nodes.iter().copied()), 2);
        let outcome = PathBranchAndBound.solve(&graph.model, &params()).unwrap();
        assert_eq!(outcome.status, SolverStatus::Infeasible);
        assert!(outcome.solution.is_none());
    }

    #[test]
    fn test_empty_path_is_a_solution_when_allowed() {
        let graph = build(0, 1000, &[], 0, false);
        let outcome = PathBranchAndBound.solve(&graph.model, &params()).unwrap();
        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert_eq!(outcome.solution.unwrap().objective(), 0);
    }

    #[test]
    fn test_time_limit_returns_best_found() {
        let n = 40;
        let arcs = random_graph(n, 42, 100);
        let graph = build(n, 1000, &arcs, 3, true);
        let params = SolveParams::new(Duration::from_millis(200)).with_workers(2);

        let started = Instant::now();
        let outcome = PathBranchAndBound.solve(&graph.model, &params).unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(outcome.status, SolverStatus::Feasible);
        let solution = outcome.solution.unwrap();
        assert_eq!(graph.model.evaluate(solution.values()), Some(solution.objective()));
    }

    #[test]
    fn test_deadline_before_any_solution() {
        // A single chain that must be walked end to end; the dive is longer
        // than one time-check interval, so the deadline hits before the end
        let n = 3 * TIME_CHECK_INTERVAL as usize;
        let arcs: Vec<_> = (0..n - 1).map(|k| (k, k + 1, 1, false)).collect();
        let mut graph = build(n, 10, &arcs, 0, true);
        graph
            .model
            .add_ge("all_nodes", LinearExpr::sum(graph.path.nodes.iter().copied()), n as i64);
        let params = SolveParams::new(Duration::from_micros(1)).with_workers(1);

        let outcome = PathBranchAndBound.solve(&graph.model, &params).unwrap();
        assert_eq!(outcome.status, SolverStatus::TimeoutNoSolution);
        assert!(outcome.solution.is_none());
    }

    #[test]
    fn test_single_worker_is_reproducible() {
        let arcs = random_graph(6, 99, 60);
        let graph = build(6, 200, &arcs, 1, true);
        let params = SolveParams::new(Duration::from_secs(30)).with_workers(1);
        let first = PathBranchAndBound.solve(&graph.model, &params).unwrap();
        let second = PathBranchAndBound.solve(&graph.model, &params).unwrap();
        assert_eq!(first.solution, second.solution);
    }

    #[test]
    fn test_rejects_models_without_path() {
        let mut model = Model::new();
        let a = model.new_bool_var("a");
        model.maximize(LinearExpr::new().term(a, 1));
        assert!(matches!(
            PathBranchAndBound.solve(&model, &params()),
            Err(Error::Solver(_))
        ));
    }

    #[test]
    fn test_rejects_variables_outside_path() {
        let mut graph = build(2, 10, &[(0, 1, 1, false)], 0, false);
        graph.model.new_bool_var("stray");
        assert!(matches!(
            PathBranchAndBound.solve(&graph.model, &params()),
            Err(Error::Solver(_))
        ));
    }
}
