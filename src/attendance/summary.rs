use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use utoipa::ToSchema;

use crate::attendance::round2;
use crate::model::{
    attendance::{AttendanceRecord, Status},
    employee::Employee,
};

pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub present: u32,
    pub late: u32,
    pub half_day: u32,
    /// Working days elapsed without any record.
    pub absent: u32,
    pub total_hours: f64,
    pub total_days: u32,
    pub working_days: u32,
}

impl Summary {
    fn absorb(&mut self, other: &Summary) {
        self.present += other.present;
        self.late += other.late;
        self.half_day += other.half_day;
        self.absent += other.absent;
        self.total_hours = round2(self.total_hours + other.total_hours);
        self.total_days += other.total_days;
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeSummary {
    pub employee: Employee,
    #[serde(flatten)]
    pub summary: Summary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentSummary {
    pub department: String,
    pub employees: u32,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Counts by stored status; absence is whatever the records leave uncovered.
pub fn summarize<'a, I>(records: I, working_days_passed: u32) -> Summary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut summary = Summary {
        working_days: working_days_passed,
        ..Summary::default()
    };
    let mut hours = 0.0;
    for record in records {
        match record.status {
            Status::Present => summary.present += 1,
            Status::Late => summary.late += 1,
            Status::HalfDay => summary.half_day += 1,
        }
        hours += record.total_hours;
        summary.total_days += 1;
    }
    summary.total_hours = round2(hours);
    summary.absent = working_days_passed.saturating_sub(summary.total_days);
    summary
}

/// One summary per roster member, in roster order. Members without records
/// are absent for every passed working day.
pub fn summarize_roster(
    roster: &[Employee],
    records: &[AttendanceRecord],
    working_days_passed: u32,
) -> Vec<EmployeeSummary> {
    let mut by_employee: HashMap<u64, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records {
        by_employee.entry(record.employee_ref).or_default().push(record);
    }

    roster
        .iter()
        .map(|employee| {
            let own = by_employee.remove(&employee.id).unwrap_or_default();
            EmployeeSummary {
                employee: employee.clone(),
                summary: summarize(own, working_days_passed),
            }
        })
        .collect()
}

/// Per-employee summaries added up by department, sorted by department name.
pub fn summarize_by_department(
    roster: &[Employee],
    records: &[AttendanceRecord],
    working_days_passed: u32,
) -> Vec<DepartmentSummary> {
    let mut departments: BTreeMap<String, DepartmentSummary> = BTreeMap::new();
    for row in summarize_roster(roster, records, working_days_passed) {
        let name = department_of(&row.employee).to_string();
        let entry = departments
            .entry(name.clone())
            .or_insert_with(|| DepartmentSummary {
                department: name,
                employees: 0,
                summary: Summary {
                    working_days: working_days_passed,
                    ..Summary::default()
                },
            });
        entry.employees += 1;
        entry.summary.absorb(&row.summary);
    }
    departments.into_values().collect()
}

pub fn department_of(employee: &Employee) -> &str {
    employee
        .department
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(UNASSIGNED)
}
