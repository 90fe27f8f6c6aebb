//! End-to-end scenarios exercising the public `loader`/`orchestrate` API
//! against representative schedules: a minimal singleton, small staffing
//! problems, a hard shift request, a forbidden succession, and a shift
//! count target resolved against the horizon-wide average.

use std::collections::HashMap;

use nurse_scheduling::{loader, orchestrate, SolveOptions};

/// Installs a `tracing` subscriber honoring `RUST_LOG`, so `cargo test --
/// --nocapture` surfaces the crate's `info!`/`debug!` compile-and-solve
/// trail. Idempotent: every test calls it, only the first call wins.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_test_writer()
        .try_init();
}

fn cell(assignment: &nurse_scheduling::Assignment, row: usize, col: usize) -> &str {
    &assignment.table.as_ref().expect("successful solve has a table")[row][col]
}

#[test]
fn s1_minimal_singleton() {
    init_tracing();
    let yaml = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-01-01"
    endDate: "2024-01-01"
people:
  items:
    - id: N0
shiftTypes:
  items:
    - id: D
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: D
    requiredNumPeople: 1
"#;
    let scenario = loader::load_scenario_str(yaml).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "OPTIMAL");
    assert_eq!(assignment.score, Some(0));
    assert_eq!(cell(&assignment, 0, 1), "1");
    assert_eq!(cell(&assignment, 1, 1), "Mon");
    assert_eq!(cell(&assignment, 2, 0), "N0");
    assert_eq!(cell(&assignment, 2, 1), "D");
}

#[test]
fn s2_three_nurses_one_shift_one_day() {
    init_tracing();
    let yaml = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-01-01"
    endDate: "2024-01-01"
people:
  items:
    - id: N0
    - id: N1
    - id: N2
shiftTypes:
  items:
    - id: D
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: D
    requiredNumPeople: 1
"#;
    let scenario = loader::load_scenario_str(yaml).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "OPTIMAL");
    assert_eq!(assignment.score, Some(0));
    let working: usize = (0..3).filter(|&p| *assignment.solution.get(&(0, 0, p)).unwrap_or(&false)).count();
    assert_eq!(working, 1);
}

const S3_YAML: &str = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-03-18"
    endDate: "2024-03-20"
people:
  items:
    - id: N0
    - id: N1
    - id: N2
    - id: N3
shiftTypes:
  items:
    - id: D
    - id: E
    - id: N
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: [D, E, N]
    requiredNumPeople: 1
"#;

#[test]
fn s3_four_nurses_three_shifts_three_days() {
    init_tracing();
    let scenario = loader::load_scenario_str(S3_YAML).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "OPTIMAL");

    let mut total = 0;
    for d in 0..3 {
        for s in 0..3 {
            let filled: usize = (0..4).filter(|&p| *assignment.solution.get(&(d, s, p)).unwrap_or(&false)).count();
            assert_eq!(filled, 1, "day {d} shift {s} must be filled by exactly one nurse");
            total += filled;
        }
    }
    assert_eq!(total, 9);

    for p in 0..4 {
        let worked: usize = (0..3)
            .flat_map(|d| (0..3).map(move |s| (d, s)))
            .filter(|&(d, s)| *assignment.solution.get(&(d, s, p)).unwrap_or(&false))
            .count();
        assert!(worked <= 3, "nurse {p} worked {worked} shifts, expected <= 3");
    }
}

#[test]
fn s4_shift_request_enforcement() {
    init_tracing();
    let yaml = format!(
        "{S3_YAML}  - type: shift request\n    person: N0\n    date: \"2024-03-18\"\n    shiftType: OFF\n    weight: \"+INF\"\n"
    );
    let scenario = loader::load_scenario_str(&yaml).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "OPTIMAL");
    for s in 0..3 {
        assert_eq!(assignment.solution.get(&(0, s, 0)).copied().unwrap_or(false), false);
    }
    // S3's invariants still hold on every other cell.
    for d in 0..3 {
        for s in 0..3 {
            let filled: usize = (0..4).filter(|&p| *assignment.solution.get(&(d, s, p)).unwrap_or(&false)).count();
            assert_eq!(filled, 1);
        }
    }
}

#[test]
fn s5_unwanted_succession_is_forbidden() {
    init_tracing();
    let yaml = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-01-01"
    endDate: "2024-01-03"
people:
  items:
    - id: N0
shiftTypes:
  items:
    - id: D
    - id: N
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: D
    requiredNumPeople: 0
    preferredNumPeople: 1
    weight: 1
  - type: shift type requirement
    shiftType: N
    requiredNumPeople: 0
    preferredNumPeople: 1
    weight: 1
  - type: shift type successions
    person: N0
    pattern: [N, D]
    weight: "-INF"
"#;
    let scenario = loader::load_scenario_str(yaml).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "OPTIMAL");
    for d in 0..2 {
        let n_today = assignment.solution.get(&(d, 1, 0)).copied().unwrap_or(false);
        let d_tomorrow = assignment.solution.get(&(d + 1, 0, 0)).copied().unwrap_or(false);
        assert!(!(n_today && d_tomorrow), "forbidden N->D succession at day {d}");
    }
}

#[test]
fn s6_shift_count_target_round_avg() {
    init_tracing();
    let yaml = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-01-01"
    endDate: "2024-01-07"
people:
  items:
    - id: N0
    - id: N1
    - id: N2
    - id: N3
    - id: N4
shiftTypes:
  items:
    - id: D
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: D
    requiredNumPeople: 1
  - type: shift count
    person: ALL
    countDates: ALL
    countShiftTypes: ALL
    expression: "|x - T|^2"
    target: "round(AVG_SHIFTS_PER_PERSON)"
    weight: -1
"#;
    let scenario = loader::load_scenario_str(yaml).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "OPTIMAL");

    let mut counts: HashMap<usize, usize> = HashMap::new();
    let mut total = 0usize;
    for p in 0..5 {
        let worked: usize = (0..7).filter(|&d| *assignment.solution.get(&(d, 0, p)).unwrap_or(&false)).count();
        counts.insert(p, worked);
        total += worked;
    }
    assert_eq!(total, 7);
    for (&p, &count) in &counts {
        assert!(count == 1 || count == 2, "nurse {p} worked {count} shifts, expected 1 or 2");
    }
}

/// Spec §7 "Propagation policy": a solver non-success is a structured
/// result, not a raised error — `schedule()` still returns `Ok`, with
/// `table`/`score` absent and `status` carrying the terminal status.
#[test]
fn infeasible_scenario_returns_structured_failure_not_err() {
    init_tracing();
    let yaml = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-01-01"
    endDate: "2024-01-01"
people:
  items:
    - id: N0
shiftTypes:
  items:
    - id: D
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: D
    requiredNumPeople: 2
"#;
    let scenario = loader::load_scenario_str(yaml).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "INFEASIBLE");
    assert_eq!(assignment.score, None);
    assert!(assignment.table.is_none());
}

/// Spec §4.3.4 "History back-stitching": a forbidden succession that spans
/// the horizon boundary (the person's last history entry, then day 0) is
/// enforced exactly as one entirely inside the horizon would be.
#[test]
fn shift_type_successions_back_stitches_across_history_boundary() {
    init_tracing();
    let yaml = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-01-01"
    endDate: "2024-01-01"
people:
  items:
    - id: N0
      history: [N]
shiftTypes:
  items:
    - id: D
    - id: N
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: D
    requiredNumPeople: 0
    preferredNumPeople: 1
    weight: -1
  - type: shift type requirement
    shiftType: N
    requiredNumPeople: 0
    preferredNumPeople: 1
    weight: -1
  - type: shift type successions
    person: N0
    pattern: [N, D]
    weight: "-INF"
"#;
    let scenario = loader::load_scenario_str(yaml).unwrap();
    let assignment = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap();

    assert_eq!(assignment.status, "OPTIMAL");
    assert_eq!(assignment.solution.get(&(0, 0, 0)).copied().unwrap_or(false), false);
}

/// Spec §4.3.4 / §3 invariant 5: a history entry that resolves to more
/// than one shift type (via a group) is rejected rather than silently
/// treated as "any of these".
#[test]
fn shift_type_successions_rejects_ambiguous_history_entry() {
    init_tracing();
    let yaml = r#"
apiVersion: alpha
dates:
  range:
    startDate: "2024-01-01"
    endDate: "2024-01-02"
people:
  items:
    - id: N0
      history: [weekend_shifts]
shiftTypes:
  items:
    - id: D
    - id: N
  groups:
    - id: weekend_shifts
      members: [D, N]
preferences:
  - type: at most one shift per day
  - type: shift type requirement
    shiftType: D
    requiredNumPeople: 0
    preferredNumPeople: 1
    weight: 1
  - type: shift type successions
    person: N0
    pattern: [D, D]
    weight: 1
"#;
    let scenario = loader::load_scenario_str(yaml).unwrap();
    let err = orchestrate::schedule(&scenario, &SolveOptions::default()).unwrap_err();
    assert!(matches!(err, nurse_scheduling::ScheduleError::InvalidScenario(_)));
}
