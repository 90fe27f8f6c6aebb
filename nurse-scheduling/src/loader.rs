//! YAML ingestion (spec §6.1), standing in for the external schema
//! validator collaborator at the narrow boundary this crate owns:
//! `serde_yaml` deserialization plus the structural validations named by
//! §3's invariants that are cheap to check before a solve is even attempted
//! (`apiVersion`, the horizon's ordering, `country`, and the mandatory
//! `AtMostOneShiftPerDay` preference). Per-preference identifier and weight
//! validation happens deeper in the pipeline, in the resolver and the
//! preference compiler, where the relevant maps already exist.

use std::path::Path;

use crate::error::{Result, ScheduleError};
use crate::model::{Preference, Scenario};

/// Parses a scenario from YAML bytes and runs its load-time validations.
pub fn load_scenario_str(yaml: &str) -> Result<Scenario> {
    let scenario: Scenario = serde_yaml::from_str(yaml)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

/// Reads a scenario file from disk and runs its load-time validations.
pub fn load_scenario_file(path: impl AsRef<Path>) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)?;
    load_scenario_str(&text)
}

/// The load-time subset of spec.md §3's invariants: `apiVersion`, `end >=
/// start`, a supported `country`, and the mandatory `AtMostOneShiftPerDay`
/// preference (spec §4.3.2, §6.1, §8 boundary behavior #8).
pub fn validate_scenario(scenario: &Scenario) -> Result<()> {
    if scenario.api_version != "alpha" {
        return Err(ScheduleError::InvalidScenario(format!(
            "unsupported apiVersion '{}': only \"alpha\" is accepted",
            scenario.api_version
        )));
    }

    if scenario.dates.range.end_date < scenario.dates.range.start_date {
        return Err(ScheduleError::InvalidScenario(
            "dates.range.endDate must not be before dates.range.startDate".to_string(),
        ));
    }

    if let Some(country) = &scenario.country {
        if country != "TW" {
            return Err(ScheduleError::InvalidScenario(format!(
                "country '{country}' is not supported yet"
            )));
        }
    }

    let has_at_most_one_shift_per_day = scenario
        .preferences
        .iter()
        .any(|p| matches!(p, Preference::AtMostOneShiftPerDay));
    if !has_at_most_one_shift_per_day {
        return Err(ScheduleError::InvalidScenario(
            "scenario must declare an 'at most one shift per day' preference".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
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

    #[test]
    fn parses_minimal_scenario() {
        let scenario = load_scenario_str(MINIMAL).unwrap();
        assert_eq!(scenario.api_version, "alpha");
        assert_eq!(scenario.people.items.len(), 1);
        assert_eq!(scenario.preferences.len(), 2);
    }

    #[test]
    fn rejects_missing_at_most_one_shift_per_day() {
        let without = MINIMAL.replace("  - type: at most one shift per day\n", "");
        let err = load_scenario_str(&without).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }

    #[test]
    fn rejects_unsupported_api_version() {
        let bad = MINIMAL.replace("apiVersion: alpha", "apiVersion: beta");
        let err = load_scenario_str(&bad).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let bad = MINIMAL.replace(r#"endDate: "2024-01-01""#, r#"endDate: "2023-12-31""#);
        let err = load_scenario_str(&bad).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }
}
