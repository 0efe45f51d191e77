use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate, Weekday};

/// First and last day of a month, `None` for a month outside 1–12.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some((first, last))
}

pub fn year_range(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    month_range(year, month).map(|(_, last)| last.day())
}

/// Monday through Friday. There is no holiday calendar.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Working days among `1..=through_day` of the month. `through_day` is
/// clamped to the month length.
pub fn count_working_days(year: i32, month: u32, through_day: u32) -> u32 {
    let Some((first, last)) = month_range(year, month) else {
        return 0;
    };
    let through = through_day.min(last.day()) as usize;
    first
        .iter_days()
        .take(through)
        .filter(|d| is_working_day(*d))
        .count() as u32
}

/// Working days of the month that have already started as of `today`:
/// all of them for a past month, up to and including today for the current
/// month, none for a future month.
pub fn passed_working_days(year: i32, month: u32, today: NaiveDate) -> u32 {
    let Some(len) = days_in_month(year, month) else {
        return 0;
    };
    let through = match (year, month).cmp(&(today.year(), today.month())) {
        Ordering::Less => len,
        Ordering::Equal => today.day(),
        Ordering::Greater => 0,
    };
    count_working_days(year, month, through)
}
