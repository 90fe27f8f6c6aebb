//! The solve orchestrator (spec §4.4): builds the context and compiles
//! every preference against it, configures the solver (determinism,
//! worker count, time limit), runs search behind a progress callback, and
//! hands the outcome to the extractor.
//!
//! `schedule_with_backend` is generic over [`SolverBackend`] so a
//! production CP-SAT binding can be substituted for [`ReferenceBackend`]
//! without touching this function (spec §9, "Solver interop"). `schedule`
//! and `schedule_with_progress` are the convenience entry points that wire
//! up the crate's own reference backend.

use std::time::Duration;

use tracing::{debug, info};

use crate::calendar::{Calendar, NullCalendar, Taiwan};
use crate::context::{Context, PriorAssignment};
use crate::error::Result;
use crate::extract::{extract, Assignment};
use crate::loader::validate_scenario;
use crate::model::Scenario;
use crate::preferences::{compile_preferences, ResolvedMaps};
use crate::resolver::{build_date_map, build_people_map, build_shift_type_map};
use crate::solver::reference::ReferenceBackend;
use crate::solver::{ProgressEvent, SolveConfig, SolverBackend};

/// Solver configuration knobs (spec §4.4). `avoid_solution` forbids one
/// previously-found assignment, enabling k-best enumeration by repeated
/// solving (spec §9, "Avoiding previous solutions").
#[derive(Clone, Debug, Default)]
pub struct SolveOptions {
    pub deterministic: bool,
    pub timeout: Option<Duration>,
    pub avoid_solution: Option<PriorAssignment>,
}

fn calendar_for(country: Option<&str>) -> Box<dyn Calendar> {
    match country {
        Some("TW") => Box::new(Taiwan),
        _ => Box::new(NullCalendar),
    }
}

/// Builds the model for `scenario` against `backend` and solves it,
/// reporting intermediate solutions to `on_progress`.
pub fn schedule_with_backend<B: SolverBackend>(
    scenario: &Scenario,
    backend: &mut B,
    options: &SolveOptions,
    on_progress: &mut dyn FnMut(ProgressEvent),
) -> Result<Assignment> {
    validate_scenario(scenario)?;

    let n_days = (scenario.dates.range.end_date - scenario.dates.range.start_date).num_days() as usize + 1;
    let n_shift_types = scenario.shift_types.items.len();
    let n_people = scenario.people.items.len();

    info!(n_days, n_shift_types, n_people, "resolving identifier maps");
    let calendar = calendar_for(scenario.country.as_deref());
    let sid = build_shift_type_map(&scenario.shift_types)?;
    let pid = build_people_map(&scenario.people)?;
    let did = build_date_map(&scenario.dates, calendar.as_ref(), scenario.country.as_deref())?;
    let maps = ResolvedMaps {
        sid: &sid,
        pid: &pid,
        did: &did,
        range: &scenario.dates.range,
    };

    info!("building decision variables");
    let mut ctx = Context::build(backend, n_days, n_shift_types, n_people, options.avoid_solution.as_ref());

    info!(preferences = scenario.preferences.len(), "compiling preferences");
    compile_preferences(scenario, &mut ctx, &maps)?;
    ctx.install_objective();

    for report in &ctx.reports {
        debug!(message = %report.message, "compile report");
    }

    let config = SolveConfig {
        deterministic: options.deterministic,
        num_workers: if options.deterministic {
            1
        } else {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        },
        time_limit: options.timeout,
        seed: 0,
    };

    info!(
        deterministic = options.deterministic,
        timeout_secs = options.timeout.map(|d| d.as_secs()),
        "invoking solver"
    );
    let outcome = ctx.backend.solve(&config, on_progress);
    info!(status = %outcome.status_name, objective = ?outcome.objective_value, "solver finished");

    extract(&ctx, scenario, &outcome)
}

/// Convenience entry point using the crate's [`ReferenceBackend`] (spec §9:
/// "a mock for testing" — the default/test backend this crate ships).
pub fn schedule(scenario: &Scenario, options: &SolveOptions) -> Result<Assignment> {
    schedule_with_progress(scenario, options, &mut |_| {})
}

/// As [`schedule`], but with the intermediate-solution callback exposed
/// (spec §4.4 `progress_callback`, §5 "Ordering guarantees").
pub fn schedule_with_progress(
    scenario: &Scenario,
    options: &SolveOptions,
    on_progress: &mut dyn FnMut(ProgressEvent),
) -> Result<Assignment> {
    let mut backend = ReferenceBackend::new();
    schedule_with_backend(scenario, &mut backend, options, on_progress)
}
