//! The calendar predicate collaborator (spec §6.4). The core carries no
//! holiday data itself; it only consults `Calendar::is_freeday` while
//! resolving the `WORKDAY`/`FREEDAY` date keywords (§4.1).

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{Result, ScheduleError};

pub trait Calendar {
    /// True if `date` is not a working day. `is_labor_day` treats the
    /// national Labor Day as a free day as well (the `(LABOR)` keyword
    /// variants). Errors if `date` falls outside whatever range this
    /// calendar has data for (ported from the original's `raise
    /// ValueError` on an out-of-range date).
    fn is_freeday(&self, date: NaiveDate, is_labor_day: bool) -> Result<bool>;
}

/// Ported from `workdays/taiwan.py`: a short table of 2025 special dates
/// plus a weekend default. Out of scope per spec §1 to *own* holiday data
/// beyond this pluggable predicate, but the table is retained verbatim
/// from the original so `country: "TW"` scenarios behave identically.
pub struct Taiwan;

const SPECIAL_DATES: &[(&str, bool)] = &[
    ("2025-01-01", true),
    ("2025-01-27", true),
    ("2025-01-28", true),
    ("2025-01-29", true),
    ("2025-01-30", true),
    ("2025-01-31", true),
    ("2025-02-08", false),
    ("2025-02-28", true),
    ("2025-04-03", true),
    ("2025-04-04", true),
    ("2025-05-30", true),
    ("2025-10-06", true),
    ("2025-10-10", true),
];

const VALID_RANGE_START: &str = "2025-01-01";
const VALID_RANGE_END: &str = "2025-12-31";

impl Calendar for Taiwan {
    fn is_freeday(&self, date: NaiveDate, is_labor_day: bool) -> Result<bool> {
        let start = NaiveDate::parse_from_str(VALID_RANGE_START, "%Y-%m-%d").unwrap();
        let end = NaiveDate::parse_from_str(VALID_RANGE_END, "%Y-%m-%d").unwrap();
        if date < start || date > end {
            return Err(ScheduleError::InvalidScenario(format!(
                "date {date} is outside the valid Taiwan calendar range {start}..={end}"
            )));
        }

        let date_str = date.format("%Y-%m-%d").to_string();
        for (special, is_freeday) in SPECIAL_DATES {
            if *special == date_str {
                return Ok(*is_freeday);
            }
        }

        if is_labor_day && date == NaiveDate::from_ymd_opt(2025, 5, 1).unwrap() {
            return Ok(true);
        }

        Ok(date.weekday() == Weekday::Sat || date.weekday() == Weekday::Sun)
    }
}

/// Stand-in used when a scenario declares no `country`: the resolver only
/// ever consults a calendar for the `WORKDAY`/`FREEDAY` keyword family when
/// `country` is set (§4.1), so this implementation is never actually
/// called in that configuration.
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn is_freeday(&self, _date: NaiveDate, _is_labor_day: bool) -> Result<bool> {
        unreachable!("NullCalendar consulted without a configured country")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekend_is_freeday() {
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(Taiwan.is_freeday(saturday, false).unwrap());
    }

    #[test]
    fn weekday_is_workday() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert!(!Taiwan.is_freeday(monday, false).unwrap());
    }

    #[test]
    fn special_date_overrides_weekday() {
        let new_year = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(Taiwan.is_freeday(new_year, false).unwrap());
        let makeup_workday = NaiveDate::from_ymd_opt(2025, 2, 8).unwrap();
        assert!(!Taiwan.is_freeday(makeup_workday, false).unwrap());
    }

    #[test]
    fn out_of_range_date_is_an_error() {
        let too_early = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(Taiwan.is_freeday(too_early, false).is_err());
    }

    #[test]
    fn labor_day_flag_adds_may_1() {
        let labor_day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert!(!Taiwan.is_freeday(labor_day, false).unwrap());
        assert!(Taiwan.is_freeday(labor_day, true).unwrap());
    }
}
