use chrono::{DateTime, TimeZone, Timelike, Utc};
use derive_more::Display;

use crate::attendance::round2;
use crate::model::attendance::{AttendanceRecord, CheckOutUpdate, Status};

/// Seconds after local midnight; a check-in strictly later than this is late.
pub const LATE_AFTER: u32 = 9 * 3600 + 30 * 60;

/// Shifts shorter than this many hours become half days.
pub const HALF_DAY_HOURS: f64 = 4.0;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum InvalidState {
    #[display(fmt = "You have not checked in today")]
    NotCheckedIn,
    #[display(fmt = "Already checked out today")]
    AlreadyCheckedOut,
}

impl std::error::Error for InvalidState {}

/// `at` must already carry the offset lateness is judged in.
pub fn classify_check_in<Tz: TimeZone>(at: &DateTime<Tz>) -> Status {
    let time = at.naive_local().time();
    let late = (time.num_seconds_from_midnight(), time.nanosecond()) > (LATE_AFTER, 0);
    if late { Status::Late } else { Status::Present }
}

/// Hours are rounded to two decimals before the half-day rule applies.
pub fn classify_check_out(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    current: Status,
) -> (Status, f64) {
    let millis = (check_out - check_in).num_milliseconds().max(0);
    let hours = round2(millis as f64 / 3_600_000.0);
    (resolve_short_day(current, hours), hours)
}

/// A late arrival stays late no matter how short the day was.
pub fn resolve_short_day(current: Status, hours: f64) -> Status {
    if hours < HALF_DAY_HOURS && current != Status::Late {
        Status::HalfDay
    } else {
        current
    }
}

pub fn plan_check_out(
    record: Option<&AttendanceRecord>,
    at: DateTime<Utc>,
) -> Result<CheckOutUpdate, InvalidState> {
    let record = record.ok_or(InvalidState::NotCheckedIn)?;
    if record.is_checked_out() {
        return Err(InvalidState::AlreadyCheckedOut);
    }
    let check_in = record.check_in_time.ok_or(InvalidState::NotCheckedIn)?;
    let (status, total_hours) = classify_check_out(check_in, at, record.status);
    Ok(CheckOutUpdate {
        check_out_time: at,
        status,
        total_hours,
    })
}
