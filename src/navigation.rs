use chrono::NaiveDate;
use url::Url;

use crate::calendar::{Direction, YearMonth};

pub const CALENDAR_PATH: &str = "/calendar";

/// Anything that can be sent to a calendar path: a keyboard button being
/// built, a router, a test recorder.
pub trait Navigator {
    fn navigate_to(&mut self, path: &str);
}

pub fn calendar_path(year_month: YearMonth) -> String {
    format!(
        "{}?year={}&month={}",
        CALENDAR_PATH, year_month.year, year_month.month
    )
}

/// Moves one month in `direction` from `current` and hands the resulting
/// path to `navigator`. Returns the month navigated to.
pub fn handle_month_change<N: Navigator + ?Sized>(
    direction: Direction,
    current: YearMonth,
    navigator: &mut N,
) -> YearMonth {
    let target = current.adjacent(direction);
    navigator.navigate_to(&calendar_path(target));
    target
}

pub fn is_calendar_path(data: &str) -> bool {
    data == CALENDAR_PATH || data.starts_with("/calendar?")
}

/// Reads `year`/`month` back out of a calendar path. Missing or bad query
/// values fall back to `today` the same way command arguments do.
pub fn parse_calendar_path(path: &str, today: NaiveDate) -> Option<YearMonth> {
    let base = Url::parse("https://localhost/").ok()?;
    let url = base.join(path).ok()?;
    if url.path() != CALENDAR_PATH {
        return None;
    }

    let mut year = None;
    let mut month = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "year" => year = Some(value.into_owned()),
            "month" => month = Some(value.into_owned()),
            _ => {}
        }
    }

    Some(YearMonth::from_query(
        year.as_deref(),
        month.as_deref(),
        today,
    ))
}
