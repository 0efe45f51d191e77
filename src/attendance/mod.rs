//! Attendance rules that do not touch storage or HTTP: how a timestamp
//! becomes a status, which days count, and how records fold into reports.

pub mod calendar;
pub mod dashboard;
pub mod export;
pub mod status;
pub mod summary;

/// Round to two decimal places, the precision hours are reported in.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
