use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Stored outcome of a day. Absence is never stored; it is inferred from a
/// missing record on a working day.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Status {
    Present,
    Late,
    HalfDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "employeeRef": 2,
    "date": "2024-06-03",
    "checkInTime": "2024-06-03T09:45:00Z",
    "checkOutTime": "2024-06-03T11:00:00Z",
    "status": "late",
    "totalHours": 1.25,
    "createdAt": "2024-06-03T09:45:00Z"
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_ref: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<DateTime<Utc>>,
    pub status: Status,
    pub total_hours: f64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_checked_out(&self) -> bool {
        self.check_out_time.is_some()
    }
}

/// Values written by the day's check-in.
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub employee_ref: u64,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub status: Status,
}

/// Values written by the day's check-out.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutUpdate {
    pub check_out_time: DateTime<Utc>,
    pub status: Status,
    pub total_hours: f64,
}
