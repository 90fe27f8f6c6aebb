//! The schedule extractor (spec §4.5): turns a solved model back into a
//! tabular `Assignment` a caller (or the spreadsheet exporter collaborator)
//! can render, plus the raw variable assignment needed to drive an
//! `avoid_solution` re-solve.

use chrono::{Datelike, Duration, NaiveDate};

use crate::context::{Context, PriorAssignment};
use crate::error::Result;
use crate::model::Scenario;
use crate::solver::{SolveOutcome, SolverBackend};

/// A solved roster, laid out the way the exporter collaborator expects:
/// two header rows (day-of-month/short-date, then weekday abbreviation),
/// one row per person, then a `Score` and a `Status` summary row. Column 0
/// holds the row label; columns `1..=n_days` hold the per-day cells.
///
/// Per spec §6.2/§7, a solver non-success (`INFEASIBLE`, `MODEL_INVALID`,
/// `UNKNOWN` with no incumbent) is not an error: `schedule()` still returns
/// `Ok`, with `table`/`score` `None` and `status` carrying the terminal
/// status string for the caller to present. Only validation/lowering
/// failures (§7's other error kinds) propagate as `Err`.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub table: Option<Vec<Vec<String>>>,
    pub status: String,
    pub score: Option<i64>,
    pub solution: PriorAssignment,
}

/// Ported from `exporter.py`'s day-header selection: full date when the
/// horizon spans years, month/day when it spans months within one year,
/// bare day-of-month otherwise (spec §4.5 "day-of-month or short-date").
fn day_label(date: NaiveDate, first: NaiveDate, last: NaiveDate) -> String {
    if first.year() != last.year() {
        date.format("%Y/%-m/%-d").to_string()
    } else if first.month() != last.month() {
        date.format("%-m/%-d").to_string()
    } else {
        date.format("%-d").to_string()
    }
}

pub fn extract<B: SolverBackend>(ctx: &Context<B>, scenario: &Scenario, outcome: &SolveOutcome) -> Result<Assignment> {
    if !outcome.is_success {
        return Ok(Assignment {
            table: None,
            status: outcome.status_name.clone(),
            score: None,
            solution: PriorAssignment::new(),
        });
    }

    let start = scenario.dates.range.start_date;
    let end = scenario.dates.range.end_date;
    let days: Vec<NaiveDate> = (0..ctx.n_days as i64).map(|i| start + Duration::days(i)).collect();

    let mut solution = PriorAssignment::with_capacity(ctx.shift.len());
    let mut cell_sids: Vec<Vec<Vec<i64>>> = vec![vec![Vec::new(); ctx.n_people]; ctx.n_days];
    for (&(d, s, p), &var) in &ctx.shift {
        let assigned = outcome.bool_value(var).unwrap_or(false);
        solution.insert((d, s, p), assigned);
        if assigned {
            cell_sids[d][p].push(s);
        }
    }

    let n_cols = 1 + ctx.n_days;
    let mut table = Vec::with_capacity(2 + ctx.n_people + 2);

    let mut header_day = vec![String::new(); n_cols];
    let mut header_weekday = vec![String::new(); n_cols];
    for (d, date) in days.iter().enumerate() {
        header_day[1 + d] = day_label(*date, start, end);
        header_weekday[1 + d] = date.format("%a").to_string();
    }
    table.push(header_day);
    table.push(header_weekday);

    for p in 0..ctx.n_people {
        let mut row = vec![String::new(); n_cols];
        row[0] = scenario.people.items[p].id.0.clone();
        for d in 0..ctx.n_days {
            let mut sids = cell_sids[d][p].clone();
            sids.sort_unstable();
            let labels: Vec<String> = sids.iter().map(|&s| scenario.shift_types.items[s as usize].id.0.clone()).collect();
            row[1 + d] = labels.join(",");
        }
        table.push(row);
    }

    let mut score_row = vec![String::new(); n_cols];
    score_row[0] = "Score".to_string();
    score_row[1] = outcome.objective_value.map(|v| v.to_string()).unwrap_or_default();
    table.push(score_row);

    let mut status_row = vec![String::new(); n_cols];
    status_row[0] = "Status".to_string();
    status_row[1] = outcome.status_name.clone();
    table.push(status_row);

    Ok(Assignment {
        table: Some(table),
        status: outcome.status_name.clone(),
        score: outcome.objective_value,
        solution,
    })
}
