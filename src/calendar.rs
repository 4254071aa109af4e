use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{CalendarError, CalendarResult};

/// A calendar month. Built through [`YearMonth::new`] or the query parsers,
/// which keep `month` in `1..=12` and the year inside chrono's date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Inclusive bounds of a month, as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> CalendarResult<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::InvalidMonth { year, month });
        }
        Ok(YearMonth { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Builds a month from raw `year`/`month` strings. Anything missing,
    /// unparsable or out of range falls back to the matching part of `today`.
    pub fn from_query(year: Option<&str>, month: Option<&str>, today: NaiveDate) -> Self {
        let month = month
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m))
            .unwrap_or(today.month());
        let year = year
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .unwrap_or(today.year());

        YearMonth::new(year, month).unwrap_or(YearMonth {
            year: today.year(),
            month,
        })
    }

    pub fn adjacent(self, direction: Direction) -> Self {
        match direction {
            Direction::Prev if self.month == 1 => YearMonth {
                year: self.year - 1,
                month: 12,
            },
            Direction::Prev => YearMonth {
                year: self.year,
                month: self.month - 1,
            },
            Direction::Next if self.month == 12 => YearMonth {
                year: self.year + 1,
                month: 1,
            },
            Direction::Next => YearMonth {
                year: self.year,
                month: self.month + 1,
            },
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn name(self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

/// Every date of the month, ascending. Empty for a month chrono cannot represent.
pub fn days_in_month(year_month: YearMonth) -> Vec<NaiveDate> {
    match year_month.first_day() {
        Some(first) => first
            .iter_days()
            .take_while(|day| day.month() == year_month.month)
            .collect(),
        None => Vec::new(),
    }
}

/// First and last instant of the month in `tz`. The end bound sits one
/// microsecond before the next month starts, which is the finest step
/// Postgres timestamps resolve.
pub fn month_bounds<Tz: TimeZone>(year_month: YearMonth, tz: &Tz) -> CalendarResult<MonthRange> {
    let invalid = || CalendarError::InvalidMonth {
        year: year_month.year,
        month: year_month.month,
    };
    let first = year_month.first_day().ok_or_else(invalid)?;
    let next_first = year_month
        .adjacent(Direction::Next)
        .first_day()
        .ok_or_else(invalid)?;

    Ok(MonthRange {
        start: local_midnight(tz, first),
        end: local_midnight(tz, next_first) - Duration::microseconds(1),
    })
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // A DST jump skipped midnight; the day starts at the first hour that exists.
        None => first_existing_after(tz, midnight),
    }
}

fn first_existing_after<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    (1..=3)
        .map(|hours| naive + Duration::hours(hours))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Moscow;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn month_lengths_follow_the_gregorian_calendar() {
        assert_eq!(days_in_month(ym(2024, 2)).len(), 29);
        assert_eq!(days_in_month(ym(2023, 2)).len(), 28);
        assert_eq!(days_in_month(ym(2024, 4)).len(), 30);
        assert_eq!(days_in_month(ym(2024, 1)).len(), 31);
        assert_eq!(days_in_month(ym(1900, 2)).len(), 28);
        assert_eq!(days_in_month(ym(2000, 2)).len(), 29);
    }

    #[test]
    fn days_are_consecutive_and_start_on_the_first() {
        let days = days_in_month(ym(2024, 12));
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(*days.last().unwrap(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        for pair in days.windows(2) {
            assert_eq!(pair[0].succ_opt(), Some(pair[1]));
        }
    }

    #[test]
    fn adjacent_wraps_at_year_boundaries() {
        assert_eq!(ym(2024, 1).adjacent(Direction::Prev), ym(2023, 12));
        assert_eq!(ym(2024, 12).adjacent(Direction::Next), ym(2025, 1));
        assert_eq!(ym(2024, 6).adjacent(Direction::Next), ym(2024, 7));
        assert_eq!(ym(2024, 6).adjacent(Direction::Prev), ym(2024, 5));
    }

    #[test]
    fn new_rejects_months_outside_the_year() {
        assert!(matches!(
            YearMonth::new(2024, 0),
            Err(CalendarError::InvalidMonth { year: 2024, month: 0 })
        ));
        assert!(YearMonth::new(2024, 13).is_err());
        assert!(YearMonth::new(i32::MAX, 1).is_err());
    }

    #[test]
    fn query_defaults_to_today_for_missing_or_bad_parts() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(YearMonth::from_query(None, None, today), ym(2026, 10));
        assert_eq!(YearMonth::from_query(Some("2024"), Some("2"), today), ym(2024, 2));
        assert_eq!(YearMonth::from_query(Some("abc"), Some("3"), today), ym(2026, 3));
        assert_eq!(YearMonth::from_query(Some("2024"), Some("13"), today), ym(2024, 10));
        assert_eq!(YearMonth::from_query(Some("2024"), Some("0"), today), ym(2024, 10));
        assert_eq!(YearMonth::from_query(Some("99999999"), Some("5"), today), ym(2026, 5));
    }

    #[test]
    fn february_2024_bounds_in_utc() {
        let range = month_bounds(ym(2024, 2), &Utc).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(range.end > Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());
        assert!(range.end < Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn bounds_follow_the_display_timezone() {
        let range = month_bounds(ym(2024, 3), &Moscow).unwrap();
        // Moscow is UTC+3 all year.
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 2, 29, 21, 0, 0).unwrap());
        assert!(range.end < Utc.with_ymd_and_hms(2024, 3, 31, 21, 0, 0).unwrap());
    }

    #[test]
    fn december_bounds_reach_into_next_year() {
        let range = month_bounds(ym(2024, 12), &Utc).unwrap();
        assert_eq!(
            range.end + Duration::microseconds(1),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_names() {
        assert_eq!(ym(2024, 2).name(), "February 2024");
        assert_eq!(month_name(13), "");
    }
}
