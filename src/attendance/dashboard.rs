//! View assembly for the dashboards and the manager's today board. Callers
//! fetch the records; everything here is a pure function of its inputs.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::attendance::{
    calendar::{is_working_day, passed_working_days},
    summary::{Summary, department_of, summarize},
};
use crate::model::{
    attendance::{AttendanceRecord, Status},
    employee::Employee,
};

/// Length of the trailing window shown on both dashboards.
pub const RECENT_DAYS: u64 = 7;

pub const NOT_CHECKED_IN: &str = "not-checked-in";
pub const WEEKEND: &str = "weekend";
pub const ABSENT: &str = "absent";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotCheckedIn {
    #[schema(example = "not-checked-in")]
    pub status: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
}

/// Either today's record or a placeholder saying there is none yet.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum TodayRecord {
    Record(AttendanceRecord),
    Missing(NotCheckedIn),
}

impl TodayRecord {
    pub fn new(record: Option<AttendanceRecord>, today: NaiveDate) -> Self {
        match record {
            Some(r) => TodayRecord::Record(r),
            None => TodayRecord::Missing(NotCheckedIn {
                status: NOT_CHECKED_IN.into(),
                date: today,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Mon")]
    pub day_name: String,
    /// Stored status, or `weekend` / `absent` when there is no record.
    #[schema(example = "present")]
    pub status: String,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDashboard {
    pub today: TodayRecord,
    pub monthly: Summary,
    pub recent_attendance: Vec<DayStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub employee: Employee,
    #[schema(example = "absent")]
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<chrono::DateTime<chrono::Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<chrono::DateTime<chrono::Utc>>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TodayCounts {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayStatus {
    pub employees: Vec<RosterEntry>,
    pub summary: TodayCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TodayStats {
    /// Everyone with a record today, whatever its status.
    pub present: u32,
    pub absent: u32,
    pub late: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendDay {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub day_name: String,
    pub present: u32,
    pub absent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentToday {
    pub department: String,
    pub total: u32,
    pub present: u32,
    pub absent: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    pub total_employees: u32,
    pub today_stats: TodayStats,
    pub absent_employees: Vec<Employee>,
    pub weekly_trend: Vec<TrendDay>,
    pub department_stats: Vec<DepartmentToday>,
}

/// First day of the trailing window ending on `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(RECENT_DAYS - 1))
        .unwrap_or(today)
}

fn window(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    window_start(today)
        .iter_days()
        .take(RECENT_DAYS as usize)
}

fn day_name(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// The last seven days, oldest first.
pub fn recent_days(today: NaiveDate, records: &[AttendanceRecord]) -> Vec<DayStatus> {
    let by_date: HashMap<NaiveDate, &AttendanceRecord> =
        records.iter().map(|r| (r.date, r)).collect();

    window(today)
        .map(|date| {
            let (status, total_hours) = match by_date.get(&date) {
                Some(r) => (r.status.to_string(), r.total_hours),
                None if !is_working_day(date) => (WEEKEND.to_string(), 0.0),
                None => (ABSENT.to_string(), 0.0),
            };
            DayStatus {
                date,
                day_name: day_name(date),
                status,
                total_hours,
            }
        })
        .collect()
}

/// `month_records` must cover the current month, `recent_records` the
/// trailing window; both belong to the same employee.
pub fn employee_dashboard(
    today: NaiveDate,
    today_record: Option<AttendanceRecord>,
    month_records: &[AttendanceRecord],
    recent_records: &[AttendanceRecord],
) -> EmployeeDashboard {
    let passed = passed_working_days(today.year(), today.month(), today);
    EmployeeDashboard {
        today: TodayRecord::new(today_record, today),
        monthly: summarize(month_records, passed),
        recent_attendance: recent_days(today, recent_records),
    }
}

/// Every roster member with today's status; `absent` when they have no
/// record.
pub fn today_roster(roster: &[Employee], today_records: &[AttendanceRecord]) -> TodayStatus {
    let by_employee: HashMap<u64, &AttendanceRecord> =
        today_records.iter().map(|r| (r.employee_ref, r)).collect();

    let mut counts = TodayCounts {
        present: 0,
        absent: 0,
        late: 0,
        total: roster.len() as u32,
    };
    let employees = roster
        .iter()
        .map(|employee| match by_employee.get(&employee.id) {
            Some(r) => {
                counts.present += 1;
                if r.status == Status::Late {
                    counts.late += 1;
                }
                RosterEntry {
                    employee: employee.clone(),
                    status: r.status.to_string(),
                    check_in_time: r.check_in_time,
                    check_out_time: r.check_out_time,
                    total_hours: r.total_hours,
                }
            }
            None => {
                counts.absent += 1;
                RosterEntry {
                    employee: employee.clone(),
                    status: ABSENT.to_string(),
                    check_in_time: None,
                    check_out_time: None,
                    total_hours: 0.0,
                }
            }
        })
        .collect();

    TodayStatus {
        employees,
        summary: counts,
    }
}

/// `week_records` must cover the trailing window ending today. Records of
/// anyone outside the roster are ignored.
pub fn manager_dashboard(
    today: NaiveDate,
    roster: &[Employee],
    week_records: &[AttendanceRecord],
) -> ManagerDashboard {
    let members: HashSet<u64> = roster.iter().map(|e| e.id).collect();
    let records: Vec<&AttendanceRecord> = week_records
        .iter()
        .filter(|r| members.contains(&r.employee_ref))
        .collect();
    let total = roster.len() as u32;

    let here_today: HashMap<u64, &AttendanceRecord> = records
        .iter()
        .filter(|r| r.date == today)
        .map(|r| (r.employee_ref, *r))
        .collect();
    let present = here_today.len() as u32;
    let late = here_today
        .values()
        .filter(|r| r.status == Status::Late)
        .count() as u32;

    let absent_employees: Vec<Employee> = roster
        .iter()
        .filter(|e| !here_today.contains_key(&e.id))
        .cloned()
        .collect();

    let mut per_day: HashMap<NaiveDate, HashSet<u64>> = HashMap::new();
    for r in &records {
        per_day.entry(r.date).or_default().insert(r.employee_ref);
    }
    let weekly_trend = window(today)
        .map(|date| {
            let present = per_day.get(&date).map_or(0, |s| s.len() as u32);
            TrendDay {
                date,
                day_name: day_name(date),
                present,
                absent: total.saturating_sub(present),
            }
        })
        .collect();

    let mut departments: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for employee in roster {
        let entry = departments.entry(department_of(employee)).or_default();
        entry.0 += 1;
        if here_today.contains_key(&employee.id) {
            entry.1 += 1;
        }
    }
    let department_stats = departments
        .into_iter()
        .map(|(department, (total, present))| DepartmentToday {
            department: department.to_string(),
            total,
            present,
            absent: total - present,
        })
        .collect();

    ManagerDashboard {
        total_employees: total,
        today_stats: TodayStats {
            present,
            absent: total.saturating_sub(present),
            late,
        },
        absent_employees,
        weekly_trend,
        department_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use chrono::Utc;

    fn may(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn june(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn record(employee_ref: u64, date: NaiveDate, status: Status) -> AttendanceRecord {
        AttendanceRecord {
            id: employee_ref * 1000 + u64::from(date.ordinal()),
            employee_ref,
            date,
            check_in_time: None,
            check_out_time: None,
            status,
            total_hours: 8.0,
            created_at: Utc::now(),
        }
    }

    fn employee(id: u64, department: Option<&str>) -> Employee {
        Employee {
            id,
            employee_id: format!("EMP{:03}", id),
            name: format!("Employee {}", id),
            email: format!("e{}@company.com", id),
            department: department.map(Into::into),
            role: Role::Employee,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn recent_days_marks_weekends_and_gaps() {
        // Thu 30 May .. Wed 5 June
        let records = vec![
            record(1, may(30), Status::Present),
            record(1, june(3), Status::Late),
            record(1, june(5), Status::HalfDay),
        ];
        let days = recent_days(june(5), &records);
        let got: Vec<(String, String)> = days
            .iter()
            .map(|d| (d.day_name.clone(), d.status.clone()))
            .collect();
        let expected = [
            ("Thu", "present"),
            ("Fri", "absent"),
            ("Sat", "weekend"),
            ("Sun", "weekend"),
            ("Mon", "late"),
            ("Tue", "absent"),
            ("Wed", "half-day"),
        ];
        assert_eq!(
            got,
            expected
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect::<Vec<_>>()
        );
        assert_eq!(days[0].date, may(30));
        assert_eq!(days[6].date, june(5));
        assert_eq!(days[1].total_hours, 0.0);
    }

    #[test]
    fn weekend_record_shows_its_status() {
        let records = vec![record(1, june(1), Status::Present)];
        let days = recent_days(june(5), &records);
        assert_eq!(days[2].status, "present");
    }

    #[test]
    fn today_record_placeholder_serializes_flat() {
        let json = serde_json::to_value(TodayRecord::new(None, june(3))).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not-checked-in", "date": "2024-06-03"}));

        let json = serde_json::to_value(TodayRecord::new(Some(record(1, june(3), Status::Late)), june(3)))
            .unwrap();
        assert_eq!(json["status"], "late");
        assert_eq!(json["employeeRef"], 1);
    }

    #[test]
    fn employee_dashboard_month_summary_counts_passed_days() {
        let month = vec![record(1, june(3), Status::Present), record(1, june(4), Status::Late)];
        let dash = employee_dashboard(june(5), None, &month, &month);
        // Mon 3 .. Wed 5 passed, two with records.
        assert_eq!(dash.monthly.working_days, 3);
        assert_eq!(dash.monthly.absent, 1);
        assert_eq!(dash.recent_attendance.len(), 7);
        assert!(matches!(dash.today, TodayRecord::Missing(_)));
    }

    #[test]
    fn today_roster_defaults_to_absent() {
        let roster = vec![employee(1, None), employee(2, None), employee(3, None)];
        let today = vec![
            record(1, june(3), Status::Late),
            record(3, june(3), Status::HalfDay),
        ];
        let board = today_roster(&roster, &today);
        assert_eq!(
            board.summary,
            TodayCounts {
                present: 2,
                absent: 1,
                late: 1,
                total: 3
            }
        );
        assert_eq!(board.employees[1].status, "absent");
        assert_eq!(board.employees[2].status, "half-day");
    }

    #[test]
    fn manager_dashboard_ignores_records_outside_the_roster() {
        let roster = vec![
            employee(1, Some("Sales")),
            employee(2, Some("Sales")),
            employee(3, None),
        ];
        let week = vec![
            record(1, june(5), Status::Late),
            record(2, june(4), Status::Present),
            record(1, june(4), Status::Present),
            // a manager's own record
            record(50, june(5), Status::Present),
        ];
        let dash = manager_dashboard(june(5), &roster, &week);

        assert_eq!(dash.total_employees, 3);
        assert_eq!(
            dash.today_stats,
            TodayStats {
                present: 1,
                absent: 2,
                late: 1
            }
        );
        let absent: Vec<u64> = dash.absent_employees.iter().map(|e| e.id).collect();
        assert_eq!(absent, vec![2, 3]);

        assert_eq!(dash.weekly_trend.len(), 7);
        let tue = &dash.weekly_trend[5];
        assert_eq!((tue.date, tue.present, tue.absent), (june(4), 2, 1));
        // weekends are not excluded
        let sat = &dash.weekly_trend[2];
        assert_eq!((sat.day_name.as_str(), sat.present, sat.absent), ("Sat", 0, 3));

        assert_eq!(
            dash.department_stats,
            vec![
                DepartmentToday {
                    department: "Sales".into(),
                    total: 2,
                    present: 1,
                    absent: 1
                },
                DepartmentToday {
                    department: "Unassigned".into(),
                    total: 1,
                    present: 0,
                    absent: 1
                },
            ]
        );
    }

    #[test]
    fn window_starts_six_days_back() {
        assert_eq!(window_start(june(5)), may(30));
    }
}
