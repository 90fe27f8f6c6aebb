//! The preference compiler (spec §4.3): lowers each declared preference
//! into hard constraints, soft objective terms, or both, depending on its
//! kind and weight.
//!
//! An infinite weight always promotes a soft preference to a hard
//! constraint (spec §3 Invariant 6). Two families of preference differ in
//! what "hard" means for them:
//!   - reward-style preferences (`ShiftRequest`, `ShiftTypeSuccessions`,
//!     `ShiftAffinity`) carry a 0/1 "is satisfied" indicator; `+INF` forces
//!     it true, `-INF` forces it false.
//!   - badness-style preferences (`ShiftTypeRequirement`'s staffing gap,
//!     `ShiftCount`'s target deviation) carry a non-negative "amount of
//!     violation"; either sign of infinity forces it to zero, since there
//!     is no such thing as an infinitely-rewarded violation.

mod at_most_one_shift_per_day;
mod shift_affinity;
mod shift_count;
mod shift_request;
mod shift_type_requirement;
mod shift_type_successions;

use std::collections::HashMap;

use tracing::debug;

use crate::context::Context;
use crate::error::Result;
use crate::model::{DateRange, Person, Preference, Scenario, Weight};
use crate::resolver::resolve_sids;
use crate::solver::{Comparison, LinearExpr, SolverBackend};

/// The three identifier maps every preference compiler consults, plus the
/// horizon's date range for literal date-token resolution.
pub struct ResolvedMaps<'a> {
    pub sid: &'a HashMap<String, Vec<i64>>,
    pub pid: &'a HashMap<String, Vec<usize>>,
    pub did: &'a HashMap<String, Vec<usize>>,
    pub range: &'a DateRange,
}

/// Adds `weight * expr` to the objective, where `expr` is a reward-style
/// 0/1 "is this preference satisfied" indicator. An infinite weight
/// hardens the preference in the direction its sign names instead.
pub(crate) fn apply_reward<B: SolverBackend>(ctx: &mut Context<B>, weight: Weight, expr: LinearExpr) {
    match weight {
        Weight::Finite(w) => ctx.add_objective_term(expr * w),
        Weight::PosInf => ctx.backend.add_constraint(expr - 1, Comparison::Eq, None),
        Weight::NegInf => ctx.backend.add_constraint(expr, Comparison::Eq, None),
    }
}

/// Adds `weight * expr` to the objective, where `expr` is a badness-style
/// non-negative "amount of violation". An infinite weight of either sign
/// forces the violation to zero.
pub(crate) fn apply_penalty<B: SolverBackend>(ctx: &mut Context<B>, weight: Weight, expr: LinearExpr) {
    match weight {
        Weight::Finite(w) => ctx.add_objective_term(expr * w),
        Weight::PosInf | Weight::NegInf => ctx.backend.add_constraint(expr, Comparison::Eq, None),
    }
}

/// Sums `(preferredNumPeople or requiredNumPeople) * |shift types| * n_days`
/// across every `ShiftTypeRequirement` preference in the scenario. This is
/// the `total_shifts` the `AVG_SHIFTS_PER_PERSON` family of `ShiftCount`
/// targets divides by n_people to get the horizon-wide average shift load
/// (spec §4.3.5).
fn total_shifts<B: SolverBackend>(scenario: &Scenario, ctx: &Context<B>, maps: &ResolvedMaps) -> Result<i64> {
    let mut total = 0i64;
    for preference in &scenario.preferences {
        if let Preference::ShiftTypeRequirement(p) = preference {
            let sids = resolve_sids(p.shift_type.as_slice(), maps.sid)?;
            let per_day = p.preferred_num_people.unwrap_or(p.required_num_people) as i64;
            total += per_day * sids.len() as i64 * ctx.n_days as i64;
        }
    }
    Ok(total)
}

/// Compiles every preference in `scenario` into `ctx`'s model, dispatching
/// on `Preference`'s variant.
pub fn compile_preferences<B: SolverBackend>(scenario: &Scenario, ctx: &mut Context<B>, maps: &ResolvedMaps) -> Result<()> {
    let people: &[Person] = &scenario.people.items;
    let total_shifts = total_shifts(scenario, ctx, maps)?;

    for preference in &scenario.preferences {
        debug!(kind = preference.kind_name(), "compiling preference");
        match preference {
            Preference::AtMostOneShiftPerDay => {
                at_most_one_shift_per_day::compile(ctx);
            }
            Preference::ShiftTypeRequirement(p) => {
                shift_type_requirement::compile(p, ctx, maps)?;
            }
            Preference::ShiftRequest(p) => {
                shift_request::compile(p, ctx, maps)?;
            }
            Preference::ShiftTypeSuccessions(p) => {
                shift_type_successions::compile(p, ctx, people, maps)?;
            }
            Preference::ShiftCount(p) => {
                shift_count::compile(p, ctx, maps, total_shifts)?;
            }
            Preference::ShiftAffinity(p) => {
                shift_affinity::compile(p, ctx, maps)?;
            }
        }
    }
    Ok(())
}
