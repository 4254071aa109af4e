use chrono::{Datelike, NaiveDate};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bookings::{date_key, CalendarData, GroupedBookings};
use crate::calendar::{Direction, YearMonth};
use crate::models::FormattedBooking;
use crate::navigation::{handle_month_change, Navigator};

pub const IGNORE: &str = "ignore";
pub const DAY_PREFIX: &str = "calendar:day:";
pub const NO_BOOKINGS: &str = "No bookings";

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// A day's bookings, earliest first. Equal times keep their stored order.
pub fn day_entries(bookings: &GroupedBookings, day: NaiveDate) -> Vec<FormattedBooking> {
    let mut entries = bookings.get(&date_key(day)).cloned().unwrap_or_default();
    entries.sort_by(|a, b| a.time.cmp(&b.time));
    entries
}

pub fn render_month_text(year_month: YearMonth, data: &CalendarData) -> String {
    let total: usize = data.bookings.values().map(Vec::len).sum();
    let summary = if total == 0 {
        "No bookings this month".to_string()
    } else {
        format!(
            "{} {} on {} {}",
            total,
            plural(total, "booking", "bookings"),
            data.bookings.len(),
            plural(data.bookings.len(), "day", "days"),
        )
    };
    format!(
        "📅 Booking Calendar\n{}\n\n{}\n\nTap a day to see its bookings.",
        year_month.name(),
        summary
    )
}

pub fn render_day_text(day: NaiveDate, entries: &[FormattedBooking]) -> String {
    let mut message = format!("📅 {}\n\n", day.format("%A, %-d %B %Y"));
    if entries.is_empty() {
        message.push_str(NO_BOOKINGS);
        return message;
    }
    for entry in entries {
        message.push_str(&format!(
            "🕒 {} · {} · 👤 {}\n",
            entry.time, entry.service, entry.customer
        ));
    }
    message
}

/// Month grid: title, weekday header, one button per day (Monday first),
/// then prev/next navigation.
pub fn month_keyboard(year_month: YearMonth, data: &CalendarData, today: NaiveDate) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    keyboard.push(vec![InlineKeyboardButton::callback(
        format!("📅 {}", year_month.name()),
        IGNORE,
    )]);
    keyboard.push(
        WEEKDAYS
            .iter()
            .map(|day| InlineKeyboardButton::callback(*day, IGNORE))
            .collect(),
    );

    let mut row: Vec<InlineKeyboardButton> = Vec::new();
    if let Some(first) = data.days.first() {
        for _ in 0..first.weekday().num_days_from_monday() {
            row.push(blank());
        }
    }
    for day in &data.days {
        let count = data.bookings.get(&date_key(*day)).map_or(0, Vec::len);
        row.push(InlineKeyboardButton::callback(
            day_label(*day, count, *day == today),
            format!("{}{}", DAY_PREFIX, date_key(*day)),
        ));
        if row.len() == 7 {
            keyboard.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        while row.len() < 7 {
            row.push(blank());
        }
        keyboard.push(row);
    }

    keyboard.push(navigation_row(year_month));
    InlineKeyboardMarkup::new(keyboard)
}

pub fn parse_day_callback(data: &str) -> Option<NaiveDate> {
    let raw = data.strip_prefix(DAY_PREFIX)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn day_label(day: NaiveDate, count: usize, is_today: bool) -> String {
    let mark = if is_today { "📍" } else { "" };
    if count == 0 {
        format!("{}{}", mark, day.day())
    } else {
        format!("{}{}•{}", mark, day.day(), count)
    }
}

fn blank() -> InlineKeyboardButton {
    InlineKeyboardButton::callback(" ", IGNORE)
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

/// Collects the path a month change produces into a callback button.
struct NavButton {
    label: &'static str,
    button: Option<InlineKeyboardButton>,
}

impl NavButton {
    fn new(label: &'static str) -> Self {
        NavButton { label, button: None }
    }

    fn build(self) -> InlineKeyboardButton {
        self.button
            .unwrap_or_else(|| InlineKeyboardButton::callback(self.label, IGNORE))
    }
}

impl Navigator for NavButton {
    fn navigate_to(&mut self, path: &str) {
        self.button = Some(InlineKeyboardButton::callback(self.label, path));
    }
}

fn navigation_row(year_month: YearMonth) -> Vec<InlineKeyboardButton> {
    let mut prev = NavButton::new("< Month");
    let mut next = NavButton::new("Month >");
    handle_month_change(Direction::Prev, year_month, &mut prev);
    handle_month_change(Direction::Next, year_month, &mut next);
    vec![prev.build(), next.build()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::days_in_month;
    use teloxide::types::InlineKeyboardButtonKind;

    fn entry(time: &str, service: &str, customer: &str) -> FormattedBooking {
        FormattedBooking {
            time: time.to_string(),
            service: service.to_string(),
            customer: customer.to_string(),
        }
    }

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("unexpected button kind {:?}", other),
        }
    }

    fn data_for(year_month: YearMonth, bookings: GroupedBookings) -> CalendarData {
        CalendarData {
            days: days_in_month(year_month),
            bookings,
        }
    }

    fn feb_2024() -> YearMonth {
        YearMonth::new(2024, 2).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_entries_are_sorted_by_time() {
        let mut bookings = GroupedBookings::new();
        bookings.insert(
            "2024-02-05".to_string(),
            vec![entry("14:30", "Wedding", "Boris"), entry("09:00", "Portrait", "Anna")],
        );

        let entries = day_entries(&bookings, date(2024, 2, 5));

        assert_eq!(entries[0].time, "09:00");
        assert_eq!(entries[1].time, "14:30");
        let text = render_day_text(date(2024, 2, 5), &entries);
        assert!(text.find("09:00").unwrap() < text.find("14:30").unwrap());
        assert!(text.starts_with("📅 Monday, 5 February 2024"));
    }

    #[test]
    fn empty_month_renders_no_bookings_for_every_day() {
        let data = data_for(feb_2024(), GroupedBookings::new());

        for day in &data.days {
            let entries = day_entries(&data.bookings, *day);
            assert!(entries.is_empty());
            assert!(render_day_text(*day, &entries).ends_with(NO_BOOKINGS));
        }
        assert!(render_month_text(feb_2024(), &data).contains("No bookings this month"));
    }

    #[test]
    fn keyboard_has_one_cell_per_day() {
        let mut bookings = GroupedBookings::new();
        bookings.insert("2024-02-10".to_string(), vec![entry("10:00", "Portrait", "Anna")]);
        let data = data_for(feb_2024(), bookings);

        let keyboard = month_keyboard(feb_2024(), &data, date(2024, 2, 20));

        let day_cells: Vec<&InlineKeyboardButton> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter(|b| callback_data(b).starts_with(DAY_PREFIX))
            .collect();
        assert_eq!(day_cells.len(), 29);
        assert_eq!(callback_data(day_cells[0]), "calendar:day:2024-02-01");
        assert_eq!(day_cells[9].text, "10•1");
        assert_eq!(day_cells[19].text, "📍20");

        // 1 Feb 2024 is a Thursday: three blanks lead the first week.
        let first_week = &keyboard.inline_keyboard[2];
        assert_eq!(first_week.len(), 7);
        assert!(first_week[..3].iter().all(|b| callback_data(b) == IGNORE));
        assert_eq!(first_week[3].text, "1");
        assert!(keyboard.inline_keyboard.iter().all(|row| row.len() <= 7));
    }

    #[test]
    fn navigation_row_points_at_adjacent_months() {
        let january = YearMonth::new(2024, 1).unwrap();
        let data = data_for(january, GroupedBookings::new());

        let keyboard = month_keyboard(january, &data, date(2024, 1, 1));
        let nav = keyboard.inline_keyboard.last().unwrap();

        assert_eq!(callback_data(&nav[0]), "/calendar?year=2023&month=12");
        assert_eq!(callback_data(&nav[1]), "/calendar?year=2024&month=2");
    }

    #[test]
    fn month_summary_counts_bookings_and_days() {
        let mut bookings = GroupedBookings::new();
        bookings.insert(
            "2024-02-10".to_string(),
            vec![entry("10:00", "Portrait", "Anna"), entry("12:00", "Family", "Boris")],
        );
        bookings.insert("2024-02-11".to_string(), vec![entry("15:45", "Wedding", "Clara")]);
        let text = render_month_text(feb_2024(), &data_for(feb_2024(), bookings));

        assert!(text.contains("February 2024"));
        assert!(text.contains("3 bookings on 2 days"));
    }

    #[test]
    fn day_callbacks_parse_back_to_dates() {
        assert_eq!(parse_day_callback("calendar:day:2024-02-29"), Some(date(2024, 2, 29)));
        assert_eq!(parse_day_callback("calendar:day:2023-02-29"), None);
        assert_eq!(parse_day_callback(IGNORE), None);
    }
}
