//! `AtMostOneShiftPerDay`: the mandatory hard constraint every scenario
//! must declare (validated at load time, spec §6.1). Every person works at
//! most one shift type per day; the `off[d,p]` indicator (spec §4.2)
//! relies on this being true to mean exactly "not assigned any shift".

use crate::context::Context;
use crate::solver::{Comparison, LinearExpr, SolverBackend};

pub fn compile<B: SolverBackend>(ctx: &mut Context<B>) {
    for d in 0..ctx.n_days {
        for p in 0..ctx.n_people {
            let sum = LinearExpr::sum((0..ctx.n_shift_types as i64).map(|s| LinearExpr::from(ctx.shift[&(d, s, p)])));
            ctx.backend.add_constraint(sum + (-1), Comparison::Le, None);
        }
    }
}
