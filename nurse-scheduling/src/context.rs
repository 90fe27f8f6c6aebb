//! The context builder (spec §4.2): materializes the `shift[d,s,p]`
//! decision variables, the channeled `off[d,p]` indicators, and the
//! lookup maps the preference compiler (§4.3) queries by partial key.

use std::collections::HashMap;

use tracing::debug;

use crate::solver::{channel_bool, BoolVar, Comparison, LinearExpr, SolverBackend};

/// A note the pipeline leaves behind for debug logging (mirrors the
/// original's informal `report` accumulation during compilation).
#[derive(Clone, Debug)]
pub struct Report {
    pub message: String,
}

/// One previously-found assignment of the `shift[d,s,p]` variables, used
/// to forbid that exact solution on a re-solve (the `avoid_solution`
/// no-good cut, spec §4.4, used to witness that a found objective value
/// is optimal by re-running with the incumbent excluded).
pub type PriorAssignment = HashMap<(usize, i64, usize), bool>;

pub struct Context<'b, B: SolverBackend> {
    pub backend: &'b mut B,
    pub n_days: usize,
    pub n_shift_types: usize,
    pub n_people: usize,

    pub shift: HashMap<(usize, i64, usize), BoolVar>,
    pub off: HashMap<(usize, usize), BoolVar>,

    /// `(day, shift type) -> every person index` (dense; useful for "who
    /// could be assigned here" style iteration).
    pub map_ds_p: HashMap<(usize, i64), Vec<usize>>,
    /// `(day, person) -> every shift type id`.
    pub map_dp_s: HashMap<(usize, usize), Vec<i64>>,
    /// `day -> every (shift type, person) pair`.
    pub map_d_sp: HashMap<usize, Vec<(i64, usize)>>,
    /// `shift type -> every (day, person) pair`.
    pub map_s_dp: HashMap<i64, Vec<(usize, usize)>>,
    /// `person -> every (day, shift type) pair`.
    pub map_p_ds: HashMap<usize, Vec<(usize, i64)>>,

    objective_terms: Vec<LinearExpr>,
    pub reports: Vec<Report>,
}

impl<'b, B: SolverBackend> Context<'b, B> {
    pub fn build(backend: &'b mut B, n_days: usize, n_shift_types: usize, n_people: usize, avoid_solution: Option<&PriorAssignment>) -> Self {
        let mut shift = HashMap::with_capacity(n_days * n_shift_types * n_people);
        let mut map_ds_p: HashMap<(usize, i64), Vec<usize>> = HashMap::new();
        let mut map_dp_s: HashMap<(usize, usize), Vec<i64>> = HashMap::new();
        let mut map_d_sp: HashMap<usize, Vec<(i64, usize)>> = HashMap::new();
        let mut map_s_dp: HashMap<i64, Vec<(usize, usize)>> = HashMap::new();
        let mut map_p_ds: HashMap<usize, Vec<(usize, i64)>> = HashMap::new();

        for d in 0..n_days {
            for s in 0..n_shift_types as i64 {
                for p in 0..n_people {
                    let var = backend.new_bool_var(&format!("shift_d{d}_s{s}_p{p}"));
                    shift.insert((d, s, p), var);
                    map_ds_p.entry((d, s)).or_default().push(p);
                    map_dp_s.entry((d, p)).or_default().push(s);
                    map_d_sp.entry(d).or_default().push((s, p));
                    map_s_dp.entry(s).or_default().push((d, p));
                    map_p_ds.entry(p).or_default().push((d, s));
                }
            }
        }

        let mut off = HashMap::with_capacity(n_days * n_people);
        for d in 0..n_days {
            for p in 0..n_people {
                let sum_shift = LinearExpr::sum((0..n_shift_types as i64).map(|s| LinearExpr::from(shift[&(d, s, p)])));
                let b = channel_bool(
                    backend,
                    &format!("off_d{d}_p{p}"),
                    sum_shift.clone(),
                    Comparison::Eq,
                    sum_shift + (-1),
                    Comparison::Ge,
                );
                off.insert((d, p), b);
            }
        }

        if let Some(prior) = avoid_solution {
            let literals = prior
                .iter()
                .map(|(&key, &was_true)| {
                    let var = shift[&key];
                    if was_true {
                        var.not()
                    } else {
                        var.lit()
                    }
                })
                .collect();
            backend.add_bool_or(literals);
        }

        debug!(n_days, n_shift_types, n_people, vars = shift.len() + off.len(), "context built");

        Context {
            backend,
            n_days,
            n_shift_types,
            n_people,
            shift,
            off,
            map_ds_p,
            map_dp_s,
            map_d_sp,
            map_s_dp,
            map_p_ds,
            objective_terms: Vec::new(),
            reports: Vec::new(),
        }
    }

    pub fn add_objective_term(&mut self, term: LinearExpr) {
        self.objective_terms.push(term);
    }

    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "compile report");
        self.reports.push(Report { message });
    }

    pub fn install_objective(&mut self) {
        let total = LinearExpr::sum(self.objective_terms.drain(..));
        self.backend.maximize(total);
    }
}
