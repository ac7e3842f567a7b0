//! Solver-independent optimization model
//!
//! Everything here is plain data: binary variables, integer linear constraints,
//! a path structure over node/arc literals and a linear objective to maximize.
//! Engines read a `Model` and never call back into the code that built it.

use std::collections::HashMap;
use std::fmt;

/// Handle to a binary decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub(crate) fn from_index(index: usize) -> Self {
        VarId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Sum of integer-weighted binary variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every variable with coefficient 1
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    pub fn term(mut self, var: VarId, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    pub fn add_term(&mut self, var: VarId, coef: i64) {
        if coef != 0 {
            self.terms.push((var, coef));
        }
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(var, _)| values[var.0])
            .map(|(_, coef)| coef)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl Relation {
    pub fn holds(self, activity: i64, rhs: i64) -> bool {
        match self {
            Relation::LessOrEqual => activity <= rhs,
            Relation::Equal => activity == rhs,
            Relation::GreaterOrEqual => activity >= rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::LessOrEqual => "<=",
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
        })
    }
}

/// `expr (<=|==|>=) rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: i64,
}

impl LinearConstraint {
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        self.relation.holds(self.expr.evaluate(values), self.rhs)
    }
}

/// Arc literal between two path positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathArc {
    pub tail: usize,
    pub head: usize,
    pub literal: VarId,
}

/// Selected arcs form one simple directed path
///
/// The path starts at the node whose start literal is set, ends at the node
/// whose end literal is set and visits exactly the nodes whose node literal is
/// set, without cycles. All literals false is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathConstraint {
    pub nodes: Vec<VarId>,
    pub starts: Vec<VarId>,
    pub ends: Vec<VarId>,
    pub arcs: Vec<PathArc>,
}

impl PathConstraint {
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let n = self.nodes.len();
        if self.starts.len() != n || self.ends.len() != n {
            return false;
        }
        let selected: Vec<bool> = self.nodes.iter().map(|v| values[v.0]).collect();
        let selected_count = selected.iter().filter(|s| **s).count();

        let starts: Vec<usize> = (0..n).filter(|&k| values[self.starts[k].0]).collect();
        let ends: Vec<usize> = (0..n).filter(|&k| values[self.ends[k].0]).collect();
        let arcs: Vec<&PathArc> = self.arcs.iter().filter(|a| values[a.literal.0]).collect();

        if selected_count == 0 {
            return starts.is_empty() && ends.is_empty() && arcs.is_empty();
        }
        if starts.len() != 1 || ends.len() != 1 || arcs.len() != selected_count - 1 {
            return false;
        }

        let mut successor: Vec<Option<usize>> = vec![None; n];
        let mut in_degree = vec![0usize; n];
        for arc in &arcs {
            if arc.tail >= n || arc.head >= n || !selected[arc.tail] || !selected[arc.head] {
                return false;
            }
            if successor[arc.tail].replace(arc.head).is_some() {
                return false;
            }
            in_degree[arc.head] += 1;
        }

        let start = starts[0];
        if !selected[start] || !selected[ends[0]] || in_degree[start] != 0 {
            return false;
        }

        // Walk from the start; a cycle or a dangling selection leaves nodes unvisited
        let mut visited = vec![false; n];
        let mut current = start;
        let mut count = 1;
        visited[current] = true;
        while let Some(next) = successor[current] {
            if visited[next] {
                return false;
            }
            visited[next] = true;
            current = next;
            count += 1;
        }
        count == selected_count && current == ends[0]
    }
}

/// Maximization model over binary variables
#[derive(Debug, Clone, Default)]
pub struct Model {
    variables: Vec<String>,
    constraints: Vec<LinearConstraint>,
    paths: Vec<PathConstraint>,
    objective: LinearExpr,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.variables.push(name.into());
        VarId(self.variables.len() - 1)
    }

    pub fn add_linear(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        relation: Relation,
        rhs: i64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            relation,
            rhs,
        });
    }

    pub fn add_le(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.add_linear(name, expr, Relation::LessOrEqual, rhs);
    }

    pub fn add_eq(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.add_linear(name, expr, Relation::Equal, rhs);
    }

    pub fn add_ge(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.add_linear(name, expr, Relation::GreaterOrEqual, rhs);
    }

    pub fn add_path(&mut self, path: PathConstraint) {
        self.paths.push(path);
    }

    pub fn maximize(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn var_name(&self, var: VarId) -> &str {
        &self.variables[var.0]
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn paths(&self) -> &[PathConstraint] {
        &self.paths
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Dense objective coefficients, duplicate terms summed
    pub fn objective_coefficients(&self) -> Vec<i64> {
        let mut coefs = vec![0i64; self.num_vars()];
        for (var, coef) in self.objective.terms() {
            coefs[var.0] += coef;
        }
        coefs
    }

    /// Objective value if `values` satisfies every constraint, `None` otherwise
    pub fn evaluate(&self, values: &[bool]) -> Option<i64> {
        if values.len() != self.num_vars() {
            return None;
        }
        if !self.constraints.iter().all(|c| c.is_satisfied(values)) {
            return None;
        }
        if !self.paths.iter().all(|p| p.is_satisfied(values)) {
            return None;
        }
        Some(self.objective.evaluate(values))
    }

    /// Names of the constraints `values` violates, for diagnostics
    pub fn violated_constraints(&self, values: &[bool]) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values))
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Variable assignment returned by an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: Vec<bool>,
    objective: i64,
}

impl Solution {
    pub fn new(values: Vec<bool>, objective: i64) -> Self {
        Self { values, objective }
    }

    pub fn value(&self, var: VarId) -> bool {
        self.values[var.0]
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn objective(&self) -> i64 {
        self.objective
    }

    /// Variable names set to true, mostly for logging
    pub fn true_vars<'a>(&'a self, model: &'a Model) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(move |(i, _)| model.var_name(VarId::from_index(i)))
    }
}

/// Lookup from variable to the constraints it appears in
pub(crate) fn constraint_terms_by_var(model: &Model) -> Vec<Vec<(usize, i64)>> {
    let mut by_var: Vec<HashMap<usize, i64>> = vec![HashMap::new(); model.num_vars()];
    for (c, constraint) in model.constraints().iter().enumerate() {
        for (var, coef) in constraint.expr.terms() {
            *by_var[var.0].entry(c).or_insert(0) += coef;
        }
    }
    by_var
        .into_iter()
        .map(|m| {
            let mut terms: Vec<(usize, i64)> = m.into_iter().filter(|(_, coef)| *coef != 0).collect();
            terms.sort_unstable();
            terms
        })
        .collect()
}
