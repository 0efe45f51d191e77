use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::model::{attendance::AttendanceRecord, employee::Employee};

pub const HEADER: [&str; 9] = [
    "Employee ID",
    "Name",
    "Email",
    "Department",
    "Date",
    "Check In",
    "Check Out",
    "Status",
    "Total Hours",
];

/// A record with its owner, if the owner could be resolved.
pub struct ExportRow<'a> {
    pub employee: Option<&'a Employee>,
    pub record: &'a AttendanceRecord,
}

fn time_of_day(at: Option<DateTime<Utc>>, tz: &FixedOffset) -> String {
    at.map(|t| t.with_timezone(tz).format("%-I:%M:%S %p").to_string())
        .unwrap_or_default()
}

/// Quoting only where a field needs it, `\n` line endings.
pub fn to_delimited_text(rows: &[ExportRow<'_>], tz: &FixedOffset) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for row in rows {
        let employee = row.employee;
        let record = row.record;
        writer.write_record([
            employee.map(|e| e.employee_id.clone()).unwrap_or_default(),
            employee.map(|e| e.name.clone()).unwrap_or_default(),
            employee.map(|e| e.email.clone()).unwrap_or_default(),
            employee
                .and_then(|e| e.department.clone())
                .unwrap_or_default(),
            record.date.format("%Y-%m-%d").to_string(),
            time_of_day(record.check_in_time, tz),
            time_of_day(record.check_out_time, tz),
            record.status.to_string(),
            record.total_hours.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv buffer: {}", e))?;
    String::from_utf8(bytes).context("csv output was not utf-8")
}
