//! The narrow solver capability trait (spec §6.3) plus the value types the
//! preference compiler (§4.3) builds expressions out of.
//!
//! This module owns no solving logic. It exists so that the production
//! deployment of this crate can plug in a real CP-SAT binding while the
//! crate itself stays buildable and testable against [`reference::ReferenceBackend`]
//! (see the design notes in spec.md §9: "an alternative solver backend (or
//! a mock for testing) can be substituted").

pub mod reference;

use std::collections::HashMap;
use std::ops::{Add, Mul, Neg, Sub};
use std::time::Duration;

/// Opaque handle into a backend's variable table. Both `BoolVar` and
/// `IntVar` wrap one so a backend can store them in a single array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoolVar(pub VarId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntVar(pub VarId);

impl BoolVar {
    pub fn lit(self) -> Lit {
        Lit { var: self, negated: false }
    }
    pub fn not(self) -> Lit {
        Lit { var: self, negated: true }
    }
}

/// A boolean literal: a `BoolVar` or its negation. Used by `add_bool_or`
/// and as the enforcement condition of `add_constraint` (CP-SAT's
/// `OnlyEnforceIf`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Lit {
    pub var: BoolVar,
    pub negated: bool,
}

/// A linear combination of variables (bool variables count as 0/1) plus a
/// constant. `add_constraint` interprets the expression as `expr <cmp> 0`.
#[derive(Clone, Debug, Default)]
pub struct LinearExpr {
    pub terms: Vec<(i64, VarId)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn constant(c: i64) -> Self {
        LinearExpr { terms: Vec::new(), constant: c }
    }

    pub fn term(coeff: i64, var: VarId) -> Self {
        LinearExpr { terms: vec![(coeff, var)], constant: 0 }
    }

    pub fn sum<I: IntoIterator<Item = LinearExpr>>(exprs: I) -> Self {
        let mut out = LinearExpr::default();
        for e in exprs {
            out = out + e;
        }
        out
    }
}

impl From<BoolVar> for LinearExpr {
    fn from(v: BoolVar) -> Self {
        LinearExpr::term(1, v.0)
    }
}

impl From<IntVar> for LinearExpr {
    fn from(v: IntVar) -> Self {
        LinearExpr::term(1, v.0)
    }
}

impl From<Lit> for LinearExpr {
    /// A literal as a 0/1 expression: `var` if positive, `1 - var` if negated.
    fn from(lit: Lit) -> Self {
        if lit.negated {
            LinearExpr { terms: vec![(-1, lit.var.0)], constant: 1 }
        } else {
            LinearExpr::term(1, lit.var.0)
        }
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;
    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;
    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        self + (-rhs)
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;
    fn neg(mut self) -> LinearExpr {
        for (coeff, _) in self.terms.iter_mut() {
            *coeff = -*coeff;
        }
        self.constant = -self.constant;
        self
    }
}

impl Mul<i64> for LinearExpr {
    type Output = LinearExpr;
    fn mul(mut self, rhs: i64) -> LinearExpr {
        for (coeff, _) in self.terms.iter_mut() {
            *coeff *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Add<i64> for LinearExpr {
    type Output = LinearExpr;
    fn add(mut self, rhs: i64) -> LinearExpr {
        self.constant += rhs;
        self
    }
}

impl Sub<i64> for LinearExpr {
    type Output = LinearExpr;
    fn sub(mut self, rhs: i64) -> LinearExpr {
        self.constant -= rhs;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Le,
    Lt,
    Ge,
    Gt,
}

/// Solver configuration (spec §4.4).
#[derive(Clone, Debug)]
pub struct SolveConfig {
    pub deterministic: bool,
    pub num_workers: usize,
    pub time_limit: Option<Duration>,
    pub seed: u64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        SolveConfig { deterministic: false, num_workers: num_cpus_fallback(), time_limit: None, seed: 0 }
    }
}

fn num_cpus_fallback() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// One intermediate-solution callback invocation (spec §4.4, §5).
#[derive(Clone, Copy, Debug)]
pub struct ProgressEvent {
    pub objective_value: i64,
    pub solution_count: u64,
    pub elapsed: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Optimal,
    Feasible,
    Infeasible,
    ModelInvalid,
    Unknown,
}

impl Status {
    pub fn name(self) -> &'static str {
        match self {
            Status::Optimal => "OPTIMAL",
            Status::Feasible => "FEASIBLE",
            Status::Infeasible => "INFEASIBLE",
            Status::ModelInvalid => "MODEL_INVALID",
            Status::Unknown => "UNKNOWN",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Optimal | Status::Feasible)
    }
}

/// The outcome of a `SolverBackend::solve` call: the terminal status, the
/// objective's value (if a solution was found), and the value of every
/// variable in that solution.
#[derive(Clone, Debug, Default)]
pub struct SolveOutcome {
    pub status_name: String,
    pub is_success: bool,
    pub objective_value: Option<i64>,
    pub values: HashMap<VarId, i64>,
}

impl SolveOutcome {
    pub fn bool_value(&self, v: BoolVar) -> Option<bool> {
        self.values.get(&v.0).map(|&x| x != 0)
    }

    pub fn int_value(&self, v: IntVar) -> Option<i64> {
        self.values.get(&v.0).copied()
    }
}

/// The narrow interface a CP-SAT-style solver must satisfy (spec §6.3):
/// boolean and bounded-integer decision variables, linear (in)equalities,
/// `|e|` and `a*b` equalities, boolean disjunction, conditional
/// enforcement, a maximization objective, an intermediate-solution
/// callback, a wall-time limit, and deterministic seeding.
pub trait SolverBackend {
    fn new_bool_var(&mut self, name: &str) -> BoolVar;
    fn new_int_var(&mut self, lb: i64, ub: i64, name: &str) -> IntVar;

    /// Adds `expr <cmp> 0`, active unconditionally unless `enforce_if` is
    /// given, in which case the constraint only binds when that literal
    /// is true (CP-SAT's `Add(...).OnlyEnforceIf(lit)`).
    fn add_constraint(&mut self, expr: LinearExpr, cmp: Comparison, enforce_if: Option<Lit>);

    /// At least one of `literals` must be true.
    fn add_bool_or(&mut self, literals: Vec<Lit>);

    /// `target == |expr|`.
    fn add_abs_equality(&mut self, target: IntVar, expr: LinearExpr);

    /// `target == a * b`.
    fn add_multiplication_equality(&mut self, target: IntVar, a: IntVar, b: IntVar);

    fn maximize(&mut self, expr: LinearExpr);

    fn solve(&mut self, config: &SolveConfig, on_solution: &mut dyn FnMut(ProgressEvent)) -> SolveOutcome;
}

/// Channels a boolean to a predicate (spec §4.3 "Helper: channeling a
/// boolean to a predicate"): introduces a fresh bool `b` such that
/// `b == true_expr <cmp> 0` holds in every feasible assignment, by adding
/// `true_expr <cmp> 0` enforced when `b`, and `false_expr <false_cmp> 0`
/// enforced when `¬b`.
pub fn channel_bool<B: SolverBackend + ?Sized>(
    backend: &mut B,
    name: &str,
    true_expr: LinearExpr,
    true_cmp: Comparison,
    false_expr: LinearExpr,
    false_cmp: Comparison,
) -> BoolVar {
    let b = backend.new_bool_var(name);
    backend.add_constraint(true_expr, true_cmp, Some(b.lit()));
    backend.add_constraint(false_expr, false_cmp, Some(b.not()));
    b
}
