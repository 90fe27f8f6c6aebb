//! `ShiftCount`: compares how many of a person's assignments over a date
//! set fall into a shift-type set against a target, via one or more
//! `(expression, target)` pairs evaluated independently and summed into
//! the objective (spec §4.3.5). `target` may be a literal integer or one of
//! the `floor(AVG_SHIFTS_PER_PERSON)` / `ceil(AVG_SHIFTS_PER_PERSON)` /
//! `round(AVG_SHIFTS_PER_PERSON)` keywords, each resolved against the
//! horizon-wide average shift load (`round` using half-to-even, matching
//! Python 3's `round()` builtin).

use crate::context::Context;
use crate::error::{Result, ScheduleError};
use crate::model::{ShiftCountPreference, TargetSpec, Weight};
use crate::resolver::{resolve_dates, resolve_pids, resolve_sids, OFF_SID};
use crate::solver::{channel_bool, Comparison, LinearExpr, SolverBackend};

use super::{apply_penalty, apply_reward, ResolvedMaps};

fn round_half_to_even(x: f64) -> i64 {
    let floor = x.floor();
    let frac = x - floor;
    if (frac - 0.5).abs() < 1e-9 {
        let floor_i = floor as i64;
        if floor_i % 2 == 0 {
            floor_i
        } else {
            floor_i + 1
        }
    } else {
        x.round() as i64
    }
}

/// Resolves `target` against `total_shifts` (see [`super::total_shifts`]).
fn resolve_target(target: &TargetSpec, total_shifts: i64, n_people: usize) -> Result<i64> {
    let avg = total_shifts as f64 / n_people.max(1) as f64;
    match target {
        TargetSpec::Literal(v) => Ok(*v),
        TargetSpec::Keyword(k) if k == "floor(AVG_SHIFTS_PER_PERSON)" => Ok(avg.floor() as i64),
        TargetSpec::Keyword(k) if k == "ceil(AVG_SHIFTS_PER_PERSON)" => Ok(avg.ceil() as i64),
        TargetSpec::Keyword(k) if k == "round(AVG_SHIFTS_PER_PERSON)" => Ok(round_half_to_even(avg)),
        TargetSpec::Keyword(other) => Err(ScheduleError::UnsupportedExpression(other.clone())),
    }
}

pub fn compile<B: SolverBackend>(
    pref: &ShiftCountPreference,
    ctx: &mut Context<B>,
    maps: &ResolvedMaps,
    total_shifts: i64,
) -> Result<()> {
    let pids = resolve_pids(pref.person.as_slice(), maps.pid)?;
    let dates = resolve_dates(pref.count_dates.as_slice(), maps.did, maps.range)?;
    let sids = resolve_sids(pref.count_shift_types.as_slice(), maps.sid)?;

    let expressions = pref.expression.as_slice();
    let targets = pref.target.as_slice();
    if expressions.len() != targets.len() {
        return Err(ScheduleError::InvalidScenario(
            "shift count preference must declare the same number of expressions and targets".to_string(),
        ));
    }

    for &p in &pids {
        let count = LinearExpr::sum(dates.iter().flat_map(|&d| {
            sids.iter().map(move |&s| {
                if s == OFF_SID {
                    LinearExpr::from(ctx.off[&(d, p)])
                } else {
                    LinearExpr::from(ctx.shift[&(d, s, p)])
                }
            })
        }));

        for (expr_str, target_spec) in expressions.iter().zip(targets.iter()) {
            let target = resolve_target(target_spec, total_shifts, ctx.n_people)?;
            // Bound used for the deviation variables, ported verbatim from
            // the original's MAX = max(total_shifts - T, T).
            let bound = (total_shifts - target).max(target).max(0);

            match expr_str.as_str() {
                "|x - T|^2" => {
                    match pref.weight {
                        Weight::PosInf => {
                            return Err(ScheduleError::UnsupportedExpression(
                                "+INF weight is not supported for the '|x - T|^2' shift count expression".to_string(),
                            ))
                        }
                        Weight::Finite(w) if w > 0 => {
                            return Err(ScheduleError::InvalidScenario(
                                "weight must be non-positive for the '|x - T|^2' shift count expression".to_string(),
                            ))
                        }
                        _ => {}
                    }
                    let diff = ctx.backend.new_int_var(-bound, bound, &format!("count_diff_p{p}"));
                    ctx.backend.add_constraint(LinearExpr::from(diff) - count.clone() + target, Comparison::Eq, None);
                    let abs_diff = ctx.backend.new_int_var(0, bound, &format!("count_abs_diff_p{p}"));
                    ctx.backend.add_abs_equality(abs_diff, LinearExpr::from(diff));
                    let squared = ctx.backend.new_int_var(0, bound * bound, &format!("count_abs_diff_sq_p{p}"));
                    ctx.backend.add_multiplication_equality(squared, abs_diff, abs_diff);
                    apply_penalty(ctx, pref.weight, LinearExpr::from(squared));
                }
                "x >= T" | "x <= T" | "x > T" | "x < T" | "x = T" => {
                    let (true_cmp, false_cmp) = match expr_str.as_str() {
                        "x >= T" => (Comparison::Ge, Comparison::Lt),
                        "x <= T" => (Comparison::Le, Comparison::Gt),
                        "x > T" => (Comparison::Gt, Comparison::Le),
                        "x < T" => (Comparison::Lt, Comparison::Ge),
                        _ => (Comparison::Eq, Comparison::Ne),
                    };
                    let shifted = count.clone() + (-target);
                    let indicator = channel_bool(
                        ctx.backend,
                        &format!("count_holds_p{p}"),
                        shifted.clone(),
                        true_cmp,
                        shifted,
                        false_cmp,
                    );
                    apply_reward(ctx, pref.weight, LinearExpr::from(indicator));
                }
                other => return Err(ScheduleError::UnsupportedExpression(other.to_string())),
            }
        }
    }

    ctx.report(format!("shift count compiled over {} person(s)", pids.len()));
    Ok(())
}
