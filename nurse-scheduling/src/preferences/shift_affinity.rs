//! `ShiftAffinity`: rewards (or penalizes) one person from `people1` and
//! one from `people2` sharing a shift type from `shiftTypes` on the same
//! date (spec §4.3; under-specified in the source material, resolved here
//! as a pairwise co-assignment indicator — see DESIGN.md). The boolean AND
//! of the two people's 0/1 assignment indicators is linearized with the
//! standard `b <= x`, `b <= y`, `b >= x + y - 1` triple rather than
//! `AddMultiplicationEquality`, which this crate reserves for genuine
//! integer products (`ShiftCount`'s squared-deviation penalty).

use crate::context::Context;
use crate::error::Result;
use crate::resolver::{resolve_dates, resolve_pids, resolve_sids, OFF_SID};
use crate::model::ShiftAffinityPreference;
use crate::solver::{Comparison, LinearExpr, SolverBackend};

use super::{apply_reward, ResolvedMaps};

fn assignment_indicator<B: SolverBackend>(ctx: &Context<B>, d: usize, s: i64, p: usize) -> LinearExpr {
    if s == OFF_SID {
        LinearExpr::from(ctx.off[&(d, p)])
    } else {
        LinearExpr::from(ctx.shift[&(d, s, p)])
    }
}

pub fn compile<B: SolverBackend>(pref: &ShiftAffinityPreference, ctx: &mut Context<B>, maps: &ResolvedMaps) -> Result<()> {
    let people1 = resolve_pids(pref.people1.as_slice(), maps.pid)?;
    let people2 = resolve_pids(pref.people2.as_slice(), maps.pid)?;
    let dates = resolve_dates(pref.dates.as_slice(), maps.did, maps.range)?;
    let sids = resolve_sids(pref.shift_types.as_slice(), maps.sid)?;

    let mut pairs_built = 0usize;
    for &d in &dates {
        for &s in &sids {
            for &p1 in &people1 {
                for &p2 in &people2 {
                    if p1 == p2 {
                        continue;
                    }
                    let x = assignment_indicator(ctx, d, s, p1);
                    let y = assignment_indicator(ctx, d, s, p2);
                    let together = ctx.backend.new_bool_var(&format!("affinity_d{d}_s{s}_p{p1}_p{p2}"));
                    ctx.backend.add_constraint(LinearExpr::from(together) - x.clone(), Comparison::Le, None);
                    ctx.backend.add_constraint(LinearExpr::from(together) - y.clone(), Comparison::Le, None);
                    ctx.backend
                        .add_constraint(LinearExpr::from(together) - x - y + 1, Comparison::Ge, None);
                    apply_reward(ctx, pref.weight, LinearExpr::from(together));
                    pairs_built += 1;
                }
            }
        }
    }

    ctx.report(format!("shift affinity compiled {pairs_built} pair/date/shift combination(s)"));
    Ok(())
}
