//! The identifier resolver (spec §4.1): expands IDs, groups, keywords, and
//! date expressions into sorted, de-duplicated index sets.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::calendar::Calendar;
use crate::error::{Result, ScheduleError};
use crate::model::{DatesContainer, PeopleContainer, ShiftTypesContainer, Token};

pub const ALL: &str = "ALL";
pub const OFF: &str = "OFF";
/// Reserved pseudo shift-type index for "OFF", used only in preference
/// lookup — never materialized as a `shift` decision variable.
pub const OFF_SID: i64 = -1;

const WEEKDAYS: &[&str] = &[
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

const DATE_KEYWORDS: &[&str] = &[
    "WEEKDAY",
    "WEEKEND",
    "WORKDAY",
    "FREEDAY",
    "WORKDAY(LABOR)",
    "FREEDAY(LABOR)",
];

fn invalid(msg: impl Into<String>) -> ScheduleError {
    ScheduleError::InvalidScenario(msg.into())
}

fn unresolved(namespace: &'static str, id: &str) -> ScheduleError {
    ScheduleError::UnresolvedIdentifier {
        namespace,
        id: id.to_string(),
    }
}

/// Resolves a group ID against a base (non-group) map and a table of raw,
/// not-yet-resolved group definitions, recursing into nested groups and
/// memoizing as it goes. A group reachable from itself (directly or
/// transitively) is an `InvalidScenario` error, not a stack overflow
/// (spec §4.1 "Error conditions: ... cyclic group membership").
fn resolve_group_recursive<T: Clone + Ord>(
    key: &str,
    base: &HashMap<String, Vec<T>>,
    raw_groups: &HashMap<String, Vec<Token>>,
    resolved: &mut HashMap<String, Vec<T>>,
    visiting: &mut HashSet<String>,
    namespace: &'static str,
) -> Result<Vec<T>> {
    if let Some(v) = base.get(key) {
        return Ok(v.clone());
    }
    if let Some(v) = resolved.get(key) {
        return Ok(v.clone());
    }
    if !visiting.insert(key.to_string()) {
        return Err(invalid(format!(
            "cyclic group membership detected at '{key}'"
        )));
    }
    let members = raw_groups.get(key).ok_or_else(|| unresolved(namespace, key))?;
    let mut out = Vec::new();
    for member in members {
        out.extend(resolve_group_recursive(&member.0, base, raw_groups, resolved, visiting, namespace)?);
    }
    visiting.remove(key);
    out.sort_unstable();
    out.dedup();
    resolved.insert(key.to_string(), out.clone());
    Ok(out)
}

/// Builds `map_sid_s`: shift-type/group ID -> sorted shift-type indices.
/// `ALL` expands to every shift type; `OFF` expands to the reserved
/// sentinel `[OFF_SID]`. Groups are resolved recursively so a group may
/// reference another group declared anywhere in the file; a cycle among
/// them is rejected rather than silently truncated.
pub fn build_shift_type_map(container: &ShiftTypesContainer) -> Result<HashMap<String, Vec<i64>>> {
    let mut base: HashMap<String, Vec<i64>> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (s, item) in container.items.iter().enumerate() {
        let key = item.id.0.clone();
        if key.to_uppercase() == ALL || key.to_uppercase() == OFF {
            return Err(invalid(format!(
                "shift type ID cannot be one of the reserved values: {key}"
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(invalid(format!("duplicated shift type ID: {key}")));
        }
        base.insert(key, vec![s as i64]);
    }
    base.insert(ALL.to_string(), (0..container.items.len() as i64).collect());
    base.insert(OFF.to_string(), vec![OFF_SID]);

    let mut raw_groups: HashMap<String, Vec<Token>> = HashMap::new();
    for group in &container.groups {
        let key = group.id.0.clone();
        if key.to_uppercase() == ALL || key.to_uppercase() == OFF {
            return Err(invalid(format!(
                "shift type group ID cannot be one of the reserved values: {key}"
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(invalid(format!(
                "duplicated shift type group (or shift type) ID: {key}"
            )));
        }
        raw_groups.insert(key, group.members.clone());
    }

    let mut map = base.clone();
    let mut resolved: HashMap<String, Vec<i64>> = HashMap::new();
    for group in &container.groups {
        let key = &group.id.0;
        let mut visiting = HashSet::new();
        let v = resolve_group_recursive(key, &base, &raw_groups, &mut resolved, &mut visiting, "shift type")?;
        map.insert(key.clone(), v);
    }
    Ok(map)
}

/// Builds `map_pid_p`: person/group ID -> sorted person indices. See
/// [`build_shift_type_map`] for the group-resolution strategy.
pub fn build_people_map(container: &PeopleContainer) -> Result<HashMap<String, Vec<usize>>> {
    let mut base: HashMap<String, Vec<usize>> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (p, person) in container.items.iter().enumerate() {
        let key = person.id.0.clone();
        if key.to_uppercase() == ALL {
            return Err(invalid(format!(
                "person ID cannot be one of the reserved values: {{ALL}}, got {key}"
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(invalid(format!("duplicated person ID: {key}")));
        }
        base.insert(key, vec![p]);
    }
    base.insert(ALL.to_string(), (0..container.items.len()).collect());

    let mut raw_groups: HashMap<String, Vec<Token>> = HashMap::new();
    for group in &container.groups {
        let key = group.id.0.clone();
        if key.to_uppercase() == ALL {
            return Err(invalid(format!(
                "people group ID cannot be one of the reserved values: {{ALL}}, got {key}"
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(invalid(format!(
                "duplicated people group (or person) ID: {key}"
            )));
        }
        raw_groups.insert(key, group.members.clone());
    }

    let mut map = base.clone();
    let mut resolved: HashMap<String, Vec<usize>> = HashMap::new();
    for group in &container.groups {
        let key = &group.id.0;
        let mut visiting = HashSet::new();
        let v = resolve_group_recursive(key, &base, &raw_groups, &mut resolved, &mut visiting, "person")?;
        map.insert(key.clone(), v);
    }
    Ok(map)
}

/// Builds `map_did_d`: date ID/keyword/group -> sorted day indices.
/// Built in the order spec.md §4.1 mandates: literal calendar dates, then
/// keyword predicates, then weekday names, then user-declared groups.
pub fn build_date_map(
    dates: &DatesContainer,
    calendar: &dyn Calendar,
    country: Option<&str>,
) -> Result<HashMap<String, Vec<usize>>> {
    if let Some(c) = country {
        if c != "TW" {
            return Err(invalid(format!("country {c} is not supported yet")));
        }
    }

    let start = dates.range.start_date;
    let end = dates.range.end_date;
    let n_days = (end - start).num_days() as usize + 1;
    let days: Vec<NaiveDate> = (0..n_days as i64)
        .map(|i| start + Duration::days(i))
        .collect();

    let mut map: HashMap<String, Vec<usize>> = HashMap::new();
    map.insert(ALL.to_string(), (0..n_days).collect());
    for (d, date) in days.iter().enumerate() {
        map.insert(date.format("%Y-%m-%d").to_string(), vec![d]);
    }

    let has_country = country.is_some();
    let keyword_predicate = |keyword: &str, date: &NaiveDate| -> Result<bool> {
        Ok(match keyword {
            "WEEKDAY" => date.weekday().num_days_from_monday() < 5,
            "WEEKEND" => date.weekday().num_days_from_monday() >= 5,
            "WORKDAY" => has_country && !calendar.is_freeday(*date, false)?,
            "FREEDAY" => has_country && calendar.is_freeday(*date, false)?,
            "WORKDAY(LABOR)" => has_country && !calendar.is_freeday(*date, true)?,
            "FREEDAY(LABOR)" => has_country && calendar.is_freeday(*date, true)?,
            _ => unreachable!(),
        })
    };
    for keyword in DATE_KEYWORDS {
        if matches!(*keyword, "WORKDAY" | "FREEDAY" | "WORKDAY(LABOR)" | "FREEDAY(LABOR)") && !has_country {
            continue;
        }
        let mut indices = Vec::new();
        for (i, d) in days.iter().enumerate() {
            if keyword_predicate(keyword, d)? {
                indices.push(i);
            }
        }
        map.insert(keyword.to_string(), indices);
    }

    for (i, name) in WEEKDAYS.iter().enumerate() {
        let weekday = Weekday::try_from(i as u8).unwrap();
        let indices: Vec<usize> = days
            .iter()
            .enumerate()
            .filter(|(_, d)| d.weekday() == weekday)
            .map(|(i, _)| i)
            .collect();
        map.insert(name.to_string(), indices);
    }

    let mut raw_groups: HashMap<String, Vec<Token>> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    for group in &dates.groups {
        let key = group.id.0.clone();
        if key.to_uppercase() == ALL
            || DATE_KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(&key))
            || WEEKDAYS.iter().any(|wd| wd.eq_ignore_ascii_case(&key))
            || looks_like_date_literal(&key)
        {
            return Err(invalid(format!(
                "date group ID cannot be a reserved keyword or date-format ID: {key}"
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(invalid(format!("duplicated date group ID: {key}")));
        }
        raw_groups.insert(key, group.members.clone());
    }
    for group in &dates.groups {
        let mut visiting = HashSet::new();
        resolve_date_group(&group.id.0, &mut map, &raw_groups, &mut visiting, &dates.range)?;
    }

    Ok(map)
}

/// Resolves a date group ID, recursing into nested date groups (memoizing
/// into `map` as it goes) and falling back to literal date-token
/// resolution for members that name neither a group nor an already-known
/// key. A cycle among date groups is rejected (spec §4.1).
fn resolve_date_group(
    key: &str,
    map: &mut HashMap<String, Vec<usize>>,
    raw_groups: &HashMap<String, Vec<Token>>,
    visiting: &mut HashSet<String>,
    range: &crate::model::DateRange,
) -> Result<Vec<usize>> {
    if let Some(v) = map.get(key) {
        return Ok(v.clone());
    }
    if !raw_groups.contains_key(key) {
        return resolve_one_date_token(key, map, range);
    }
    if !visiting.insert(key.to_string()) {
        return Err(invalid(format!(
            "cyclic group membership detected at '{key}'"
        )));
    }
    let mut out = HashSet::new();
    for member in &raw_groups[key] {
        out.extend(resolve_date_group(&member.0, map, raw_groups, visiting, range)?);
    }
    visiting.remove(key);
    let mut sorted: Vec<usize> = out.into_iter().collect();
    sorted.sort_unstable();
    map.insert(key.to_string(), sorted.clone());
    Ok(sorted)
}

fn is_all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

/// True if `s` has the shape of a `D`, `MM-DD`, or `YYYY-MM-DD` date
/// literal (regardless of whether it names a real calendar date) — these
/// are reserved and may not be reused as a user date group ID (spec §3
/// Invariant 1, §4.1).
fn looks_like_date_literal(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if s.len() == 5 && &s[2..3] == "-" && is_all_digits(&s[0..2], 2) && is_all_digits(&s[3..5], 2) {
        return true;
    }
    if s.len() == 10
        && &s[4..5] == "-"
        && &s[7..8] == "-"
        && is_all_digits(&s[0..4], 4)
        && is_all_digits(&s[5..7], 2)
        && is_all_digits(&s[8..10], 2)
    {
        return true;
    }
    false
}

/// Parses a single date literal in one of the accepted formats: `D`,
/// `MM-DD`, or `YYYY-MM-DD` (spec §4.1).
fn parse_single_date_literal(literal: &str, start: NaiveDate, end: NaiveDate) -> Result<NaiveDate> {
    let malformed = |reason: &str| ScheduleError::MalformedDate {
        literal: literal.to_string(),
        reason: reason.to_string(),
    };

    if literal.len() <= 2 && !literal.is_empty() && literal.chars().all(|c| c.is_ascii_digit()) {
        if start.year() != end.year() || start.month() != end.month() {
            return Err(malformed(
                "pure day format (D) is not allowed when start/end dates are not in the same month",
            ));
        }
        let day: u32 = literal.parse().unwrap();
        return NaiveDate::from_ymd_opt(start.year(), start.month(), day)
            .ok_or_else(|| malformed("day out of range for the horizon's month"));
    }

    if literal.len() == 5 && &literal[2..3] == "-" && is_all_digits(&literal[0..2], 2) && is_all_digits(&literal[3..5], 2) {
        if start.year() != end.year() {
            return Err(malformed(
                "pure month-day format (MM-DD) is not allowed when start/end dates are not in the same year",
            ));
        }
        let month: u32 = literal[0..2].parse().unwrap();
        let day: u32 = literal[3..5].parse().unwrap();
        return NaiveDate::from_ymd_opt(start.year(), month, day)
            .ok_or_else(|| malformed("invalid month/day for MM-DD literal"));
    }

    if literal.len() == 10
        && &literal[4..5] == "-"
        && &literal[7..8] == "-"
        && is_all_digits(&literal[0..4], 4)
        && is_all_digits(&literal[5..7], 2)
        && is_all_digits(&literal[8..10], 2)
    {
        return NaiveDate::parse_from_str(literal, "%Y-%m-%d")
            .map_err(|_| malformed("invalid calendar date"));
    }

    Err(malformed(
        "not in the format of YYYY-MM-DD, MM-DD, or D",
    ))
}

fn resolve_one_date_token(
    token: &str,
    map_did_d: &HashMap<String, Vec<usize>>,
    range: &crate::model::DateRange,
) -> Result<Vec<usize>> {
    if let Some(indices) = map_did_d.get(token) {
        return Ok(indices.clone());
    }

    let start = range.start_date;
    let end = range.end_date;
    let day_index = |date: NaiveDate| -> Result<usize> {
        if date < start || date > end {
            return Err(ScheduleError::MalformedDate {
                literal: date.format("%Y-%m-%d").to_string(),
                reason: "date is out of the range of start date and end date".to_string(),
            });
        }
        Ok((date - start).num_days() as usize)
    };

    if let Some((left, right)) = token.split_once('~') {
        let l = parse_single_date_literal(left, start, end)?;
        let r = parse_single_date_literal(right, start, end)?;
        if r < l {
            return Err(ScheduleError::MalformedDate {
                literal: token.to_string(),
                reason: "range end is before range start".to_string(),
            });
        }
        let mut out = Vec::new();
        let mut cur = l;
        while cur <= r {
            out.push(day_index(cur)?);
            cur += Duration::days(1);
        }
        return Ok(out);
    }

    let date = parse_single_date_literal(token, start, end)?;
    Ok(vec![day_index(date)?])
}

fn resolve_dates_impl(
    tokens: &[Token],
    map_did_d: &HashMap<String, Vec<usize>>,
    range: &crate::model::DateRange,
) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    for token in tokens {
        out.extend(resolve_one_date_token(&token.0, map_did_d, range)?);
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

/// Resolves a list of date tokens (IDs, keywords, weekday names, literal
/// dates, or `L~R` ranges) into sorted, de-duplicated day indices.
pub fn resolve_dates(
    tokens: &[Token],
    map_did_d: &HashMap<String, Vec<usize>>,
    range: &crate::model::DateRange,
) -> Result<Vec<usize>> {
    if tokens.is_empty() {
        return Err(invalid("date expression must not be empty"));
    }
    resolve_dates_impl(tokens, map_did_d, range)
}

/// Resolves a list of shift-type tokens into sorted, de-duplicated indices
/// (including the reserved `OFF_SID` sentinel for the `OFF` keyword).
pub fn resolve_sids(tokens: &[Token], map_sid_s: &HashMap<String, Vec<i64>>) -> Result<Vec<i64>> {
    let mut out = Vec::new();
    for token in tokens {
        let resolved = map_sid_s
            .get(&token.0)
            .ok_or_else(|| unresolved("shift type", &token.0))?;
        out.extend(resolved.iter().copied());
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

/// Resolves a list of person tokens into sorted, de-duplicated indices.
pub fn resolve_pids(tokens: &[Token], map_pid_p: &HashMap<String, Vec<usize>>) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    for token in tokens {
        let resolved = map_pid_p
            .get(&token.0)
            .ok_or_else(|| unresolved("person", &token.0))?;
        out.extend(resolved.iter().copied());
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

/// True if the resolved shift-type set is equivalent to the full universe
/// of shift types (used to decide whether `ShiftRequest`/`ShiftCount`
/// should be expressed in terms of the OFF indicator instead).
pub fn is_sids_equivalent_to_all(sids: &[i64], n_shift_types: usize) -> bool {
    let mut sorted = sids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len() == n_shift_types && sorted.iter().all(|&s| s >= 0) && sorted == (0..n_shift_types as i64).collect::<Vec<_>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PeopleGroup, Person, ShiftType, ShiftTypeGroup};
    use chrono::NaiveDate;

    fn people_container(items: &[&str], groups: &[(&str, &[&str])]) -> PeopleContainer {
        PeopleContainer {
            items: items
                .iter()
                .map(|id| Person { id: Token::from(*id), description: None, history: None })
                .collect(),
            groups: groups
                .iter()
                .map(|(id, members)| PeopleGroup {
                    id: Token::from(*id),
                    members: members.iter().map(|m| Token::from(*m)).collect(),
                })
                .collect(),
        }
    }

    fn shift_type_container(items: &[&str], groups: &[(&str, &[&str])]) -> ShiftTypesContainer {
        ShiftTypesContainer {
            items: items
                .iter()
                .map(|id| ShiftType { id: Token::from(*id), description: None })
                .collect(),
            groups: groups
                .iter()
                .map(|(id, members)| ShiftTypeGroup {
                    id: Token::from(*id),
                    members: members.iter().map(|m| Token::from(*m)).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn group_resolves_forward_reference() {
        // "senior" is declared before "alice_and_bob", which it references.
        let container = people_container(
            &["alice", "bob", "carol"],
            &[("senior", &["alice_and_bob"]), ("alice_and_bob", &["alice", "bob"])],
        );
        let map = build_people_map(&container).unwrap();
        assert_eq!(map["senior"], vec![0, 1]);
    }

    #[test]
    fn self_referencing_group_is_a_cycle_error() {
        let container = people_container(&["alice"], &[("loop", &["loop"])]);
        let err = build_people_map(&container).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }

    #[test]
    fn mutually_referencing_groups_are_a_cycle_error() {
        let container = shift_type_container(&["day", "night"], &[("a", &["b"]), ("b", &["a"])]);
        let err = build_shift_type_map(&container).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }

    fn range(start: &str, end: &str) -> crate::model::DateRange {
        crate::model::DateRange {
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        }
    }

    fn dates_container(start: &str, end: &str, groups: &[(&str, &[&str])]) -> DatesContainer {
        DatesContainer {
            range: range(start, end),
            groups: groups
                .iter()
                .map(|(id, members)| crate::model::DateGroup {
                    id: Token::from(*id),
                    members: members.iter().map(|m| Token::from(*m)).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn date_group_cannot_reuse_reserved_keyword() {
        let container = dates_container("2024-01-01", "2024-01-07", &[("WEEKDAY", &["2024-01-01"])]);
        let err = build_date_map(&container, &crate::calendar::NullCalendar, None).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }

    #[test]
    fn date_group_cannot_reuse_date_format_id() {
        let container = dates_container("2024-01-01", "2024-01-07", &[("01-05", &["2024-01-01"])]);
        let err = build_date_map(&container, &crate::calendar::NullCalendar, None).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }

    #[test]
    fn duplicate_date_group_id_is_rejected() {
        let container = dates_container(
            "2024-01-01",
            "2024-01-07",
            &[("weekdays_only", &["2024-01-01"]), ("weekdays_only", &["2024-01-02"])],
        );
        let err = build_date_map(&container, &crate::calendar::NullCalendar, None).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidScenario(_)));
    }

    #[test]
    fn ordinary_date_group_id_still_resolves() {
        let container = dates_container("2024-01-01", "2024-01-07", &[("my_days", &["2024-01-01", "2024-01-02"])]);
        let map = build_date_map(&container, &crate::calendar::NullCalendar, None).unwrap();
        assert_eq!(map["my_days"], vec![0, 1]);
    }

    #[test]
    fn day_only_literal_requires_same_month() {
        let r = range("2024-01-15", "2024-02-10");
        let err = parse_single_date_literal("20", r.start_date, r.end_date).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedDate { .. }));
    }

    #[test]
    fn day_only_literal_resolves_within_month() {
        let r = range("2024-03-01", "2024-03-31");
        let d = parse_single_date_literal("15", r.start_date, r.end_date).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn month_day_literal_requires_same_year() {
        let r = range("2024-12-15", "2025-01-10");
        let err = parse_single_date_literal("01-05", r.start_date, r.end_date).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedDate { .. }));
    }

    #[test]
    fn full_date_literal_always_resolves() {
        let r = range("2024-01-01", "2024-12-31");
        let d = parse_single_date_literal("2024-07-04", r.start_date, r.end_date).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
    }
}
