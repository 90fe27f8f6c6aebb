//! `ShiftTypeRequirement`: a per-(date, shift type) headcount rule (spec
//! §4.3). Without `preferredNumPeople`, `requiredNumPeople` is an exact hard
//! count. With it, `requiredNumPeople` becomes a hard lower bound and
//! `preferredNumPeople` a hard upper bound, and the gap between `preferred`
//! and `actual` is driven toward zero via the standard shortfall-slack
//! trick. `qualifiedPeople`, when given, hard-excludes everyone else from
//! that shift type on that date.

use crate::context::Context;
use crate::error::{Result, ScheduleError};
use crate::model::ShiftTypeRequirementPreference;
use crate::resolver::{resolve_dates, resolve_pids, resolve_sids};
use crate::solver::{Comparison, LinearExpr, SolverBackend};

use super::{apply_penalty, ResolvedMaps};

pub fn compile<B: SolverBackend>(pref: &ShiftTypeRequirementPreference, ctx: &mut Context<B>, maps: &ResolvedMaps) -> Result<()> {
    let sids = resolve_sids(pref.shift_type.as_slice(), maps.sid)?;
    if sids.is_empty() {
        return Err(ScheduleError::InvalidScenario(
            "shift type requirement needs a non-empty shift type set".to_string(),
        ));
    }
    if pref.preferred_num_people.is_some() && pref.weight.is_infinite() {
        return Err(ScheduleError::InvalidScenario(
            "infinite weight is not allowed for shift type requirement with preferredNumPeople; use requiredNumPeople for a hard constraint".to_string(),
        ));
    }
    let dates = match &pref.date {
        Some(d) => resolve_dates(d.as_slice(), maps.did, maps.range)?,
        None => (0..ctx.n_days).collect(),
    };
    let qualified: Option<Vec<usize>> = match &pref.qualified_people {
        Some(q) => Some(resolve_pids(q.as_slice(), maps.pid)?),
        None => None,
    };

    for &d in &dates {
        for &s in &sids {
            if s < 0 {
                continue; // OFF carries no headcount requirement
            }

            if let Some(qualified) = &qualified {
                for p in 0..ctx.n_people {
                    if !qualified.contains(&p) {
                        ctx.backend.add_constraint(LinearExpr::from(ctx.shift[&(d, s, p)]), Comparison::Eq, None);
                    }
                }
            }

            let people: Vec<usize> = qualified.clone().unwrap_or_else(|| (0..ctx.n_people).collect());
            let actual = LinearExpr::sum(people.iter().map(|&p| LinearExpr::from(ctx.shift[&(d, s, p)])));
            let required = pref.required_num_people as i64;

            match pref.preferred_num_people {
                None => {
                    ctx.backend.add_constraint(actual.clone() - required, Comparison::Eq, None);
                }
                Some(preferred) => {
                    let preferred = preferred as i64;
                    ctx.backend.add_constraint(actual.clone() - required, Comparison::Ge, None);
                    ctx.backend.add_constraint(actual.clone() - preferred, Comparison::Le, None);

                    let gap = ctx.backend.new_int_var(0, preferred.max(0), &format!("staffing_gap_d{d}_s{s}"));
                    ctx.backend.add_constraint(LinearExpr::from(gap) - preferred + actual, Comparison::Eq, None);
                    apply_penalty(ctx, pref.weight, LinearExpr::from(gap));
                }
            }
        }
    }

    ctx.report(format!(
        "shift type requirement compiled over {} shift type(s) x {} date(s)",
        sids.len(),
        dates.len()
    ));
    Ok(())
}
