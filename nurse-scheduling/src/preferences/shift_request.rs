//! `ShiftRequest`: "this person wants (or doesn't want) this shift type on
//! this date" (spec §4.3). The requested shift types resolve to a set of
//! shift-type indices, possibly including the `OFF` sentinel; because
//! `AtMostOneShiftPerDay` already guarantees at most one of `shift[d,*,p]`
//! and `off[d,p]` is ever true, the plain sum over the requested set is
//! itself a 0/1 "is the request satisfied" indicator — no fresh variable
//! or channeling needed. When the request resolves to every real shift
//! type (spec §4.3.3's `ALL` case), that sum is `1 - off[d,p]`, so we use
//! the negated `off` indicator directly rather than summing every term.

use crate::context::Context;
use crate::error::Result;
use crate::model::ShiftRequestPreference;
use crate::resolver::{is_sids_equivalent_to_all, resolve_dates, resolve_pids, resolve_sids, OFF_SID};
use crate::solver::{LinearExpr, SolverBackend};

use super::{apply_reward, ResolvedMaps};

pub fn compile<B: SolverBackend>(pref: &ShiftRequestPreference, ctx: &mut Context<B>, maps: &ResolvedMaps) -> Result<()> {
    let pids = resolve_pids(pref.person.as_slice(), maps.pid)?;
    let dates = resolve_dates(pref.date.as_slice(), maps.did, maps.range)?;
    let sids = resolve_sids(pref.shift_type.as_slice(), maps.sid)?;
    let requests_any_shift = is_sids_equivalent_to_all(&sids, ctx.n_shift_types);

    for &p in &pids {
        for &d in &dates {
            let satisfied = if requests_any_shift {
                LinearExpr::from(ctx.off[&(d, p)].not())
            } else {
                let mut sum = LinearExpr::default();
                for &s in &sids {
                    sum = sum
                        + if s == OFF_SID {
                            LinearExpr::from(ctx.off[&(d, p)])
                        } else {
                            LinearExpr::from(ctx.shift[&(d, s, p)])
                        };
                }
                sum
            };
            apply_reward(ctx, pref.weight, satisfied);
        }
    }

    ctx.report(format!(
        "shift request compiled over {} person(s) x {} date(s)",
        pids.len(),
        dates.len()
    ));
    Ok(())
}
