//! `ShiftTypeSuccessions`: rewards (or, with a negative weight, penalizes)
//! a person's actual shift-type sequence matching a declared pattern over
//! a run of consecutive dates (spec §4.3). Each pattern element names a
//! set of acceptable shift types at that offset (a single ID/group, or a
//! nested list meaning "any of these").
//!
//! Pattern windows may start before the horizon, in which case the
//! offsets that fall before day 0 are resolved against the person's
//! `history` instead of a decision variable ("history back-stitching"): a
//! history entry that doesn't belong to its offset's accepted set makes
//! the whole window unmatchable and is skipped rather than modeled.

use crate::context::Context;
use crate::error::{Result, ScheduleError};
use crate::model::ShiftTypeSuccessionsPreference;
use crate::model::{Person, Token};
use crate::resolver::{resolve_dates, resolve_pids, resolve_sids, ALL, OFF_SID};
use crate::solver::{Comparison, LinearExpr, SolverBackend};

use super::{apply_reward, ResolvedMaps};

/// Validates a person's `history` entries before they are used for
/// back-stitching (spec §3 invariant 5, §4.3.4): each entry must name a
/// single shift type (the literal `OFF` is the only token allowed to
/// resolve to more than a lone shift-type index, since it is the reserved
/// sentinel), and none may be the literal `ALL`.
fn validate_history_tokens(history: &[Token], maps: &ResolvedMaps) -> Result<()> {
    for token in history {
        let resolved = resolve_sids(std::slice::from_ref(token), maps.sid)?;
        if token.0.to_uppercase() == ALL {
            return Err(ScheduleError::InvalidScenario(format!(
                "history must not include '{ALL}', but got '{token}'"
            )));
        }
        if resolved.len() != 1 {
            return Err(ScheduleError::InvalidScenario(format!(
                "history entry '{token}' must resolve to a single shift type"
            )));
        }
    }
    Ok(())
}

pub fn compile<B: SolverBackend>(
    pref: &ShiftTypeSuccessionsPreference,
    ctx: &mut Context<B>,
    people: &[Person],
    maps: &ResolvedMaps,
) -> Result<()> {
    let pids = resolve_pids(pref.person.as_slice(), maps.pid)?;
    let len = pref.pattern.len();
    if len == 0 {
        return Err(crate::error::ScheduleError::InvalidScenario(
            "shift type successions pattern must not be empty".to_string(),
        ));
    }

    let pattern_sids: Vec<Vec<i64>> = pref
        .pattern
        .iter()
        .map(|el| resolve_sids(&el.tokens(), maps.sid))
        .collect::<Result<_>>()?;

    let allowed_starts: Option<Vec<usize>> = match &pref.date {
        Some(d) => Some(resolve_dates(d.as_slice(), maps.did, maps.range)?),
        None => None,
    };

    let n_days = ctx.n_days as i64;
    let mut matches_built = 0usize;

    for &p in &pids {
        let history = people[p].history.as_deref().unwrap_or(&[]);

        // History is only ever consulted when some window's earliest
        // offset falls before day 0, i.e. when the pattern has more than
        // one element; validate it only then (matches the original's
        // guard of only checking history when it is actually read).
        if len >= 2 && !history.is_empty() {
            validate_history_tokens(history, maps)?;
        }

        let first_start = -(len as i64 - 1);
        for d0 in first_start..n_days {
            if d0 + len as i64 - 1 >= n_days {
                break;
            }
            if d0 >= 0 {
                if let Some(starts) = &allowed_starts {
                    if !starts.contains(&(d0 as usize)) {
                        continue;
                    }
                }
            } else if allowed_starts.is_some() {
                continue;
            }

            let mut factors: Vec<LinearExpr> = Vec::with_capacity(len);
            let mut impossible = false;
            for (k, sids) in pattern_sids.iter().enumerate() {
                let day = d0 + k as i64;
                if day < 0 {
                    let offset_from_end = (-day) as usize;
                    if offset_from_end > history.len() {
                        impossible = true;
                        break;
                    }
                    let history_token = &history[history.len() - offset_from_end];
                    let history_sid = resolve_sids(std::slice::from_ref(history_token), maps.sid)?;
                    let matches_here = history_sid.iter().any(|s| sids.contains(s));
                    if !matches_here {
                        impossible = true;
                        break;
                    }
                    // History offsets that do match contribute nothing to
                    // build: they are already known to be true.
                } else {
                    let d = day as usize;
                    let mut factor = LinearExpr::default();
                    for &s in sids {
                        factor = factor
                            + if s == OFF_SID {
                                LinearExpr::from(ctx.off[&(d, p)])
                            } else {
                                LinearExpr::from(ctx.shift[&(d, s, p)])
                            };
                    }
                    factors.push(factor);
                }
            }

            if impossible || factors.is_empty() {
                continue;
            }

            matches_built += 1;
            let num_factors = factors.len() as i64;
            let sum = LinearExpr::sum(factors);
            let name = format!("succession_p{p}_d{d0}");
            let matched = crate::solver::channel_bool(
                ctx.backend,
                &name,
                sum.clone() + (-num_factors),
                Comparison::Eq,
                sum + (-num_factors) + 1,
                Comparison::Le,
            );
            apply_reward(ctx, pref.weight, LinearExpr::from(matched));
        }
    }

    ctx.report(format!(
        "shift type successions compiled {matches_built} candidate window(s) over {} person(s)",
        pids.len()
    ));
    Ok(())
}
