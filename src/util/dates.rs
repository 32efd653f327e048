use chrono::{Datelike, Days, Local, NaiveDate};

/// Day names in week order, Sunday first
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Index of an English day name (exact match, as written by the serializer)
pub fn day_index_from_name(name: &str) -> Option<u8> {
    DAY_NAMES
        .iter()
        .position(|d| *d == name)
        .and_then(|i| u8::try_from(i).ok())
}

/// The Sunday on or before `date`. At the very start of the calendar, where
/// that Sunday does not exist, `date` itself is returned.
pub fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// The Sunday starting the week of `date`, if all seven days of that week
/// are representable dates
pub fn week_start_of(date: NaiveDate) -> Option<NaiveDate> {
    let back = u64::from(date.weekday().num_days_from_sunday());
    let sunday = date.checked_sub_days(Days::new(back))?;
    sunday.checked_add_days(Days::new(6))?;
    Some(sunday)
}

/// Local calendar date today
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Sunday starting the current local week
pub fn current_week_start() -> NaiveDate {
    sunday_on_or_before(today())
}

/// Number of days in the given month (28..=31)
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// `MM/DD` label used in day headers
pub fn month_day_label(date: NaiveDate) -> String {
    format!("{:02}/{:02}", date.month(), date.day())
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
