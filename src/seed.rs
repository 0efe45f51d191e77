use std::collections::HashSet;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::attendance::calendar::is_working_day;
use crate::attendance::status::{classify_check_in, classify_check_out};
use crate::auth::password::hash_password;
use crate::model::attendance::{CheckOutUpdate, NewCheckIn};
use crate::model::employee::{NewEmployee, employee_code};
use crate::model::role::Role;
use crate::store::Store;

pub const MANAGER_EMAIL: &str = "manager@company.com";
pub const MANAGER_PASSWORD: &str = "manager123";
pub const EMPLOYEE_PASSWORD: &str = "password123";

const EMPLOYEE_COUNT: usize = 10;
const HISTORY_DAYS: u64 = 30;

const DEPARTMENTS: [&str; 7] = [
    "Engineering",
    "Design",
    "Marketing",
    "Sales",
    "HR",
    "Finance",
    "Operations",
];
const FIRST_NAMES: [&str; 16] = [
    "Arjun", "Nisha", "Ravi", "Priya", "Aman", "Divya", "Rohit", "Sneha", "Karan", "Meera",
    "Aditya", "Pooja", "Varun", "Neha", "Sanjay", "Asha",
];
const LAST_NAMES: [&str; 16] = [
    "Reddy", "Sharma", "Verma", "Patel", "Singh", "Gupta", "Kumar", "Iyer", "Nair", "Jain",
    "Das", "Rao", "Mishra", "Pillai", "Bose", "Kapoor",
];

/// One generated working day, in local wall-clock time.
#[derive(Debug, Clone)]
pub struct PlannedDay {
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub check_out: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct PlannedEmployee {
    pub name: String,
    pub email: String,
    pub department: &'static str,
    pub days: Vec<PlannedDay>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub employees: usize,
    pub records: usize,
}

fn pick<R: Rng + ?Sized>(rng: &mut R, list: &[&'static str]) -> &'static str {
    list.choose(rng).copied().unwrap_or_default()
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Roughly 5 % absent, 10 % late, 5 % short days. Status is left to the
/// same rules that live check-ins go through.
fn plan_day<R: Rng + ?Sized>(rng: &mut R, date: NaiveDate) -> Option<PlannedDay> {
    let roll: f64 = rng.gen_range(0.0..1.0);
    if roll < 0.05 {
        return None;
    }

    let check_in = if roll < 0.15 {
        // 09:31 - 10:29
        if rng.gen_bool(0.5) {
            at(9, rng.gen_range(31..60))
        } else {
            at(10, rng.gen_range(0..30))
        }
    } else if rng.gen_bool(0.5) {
        at(8, rng.gen_range(0..60))
    } else {
        at(9, rng.gen_range(0..=30))
    };

    let check_out = if rng.gen_bool(0.05) {
        check_in + Duration::minutes(rng.gen_range(120..=210))
    } else {
        at(rng.gen_range(17..=19), rng.gen_range(0..60))
    };

    Some(PlannedDay {
        date,
        check_in,
        check_out,
    })
}

/// Ten uniquely-addressed employees with the weekdays of the last thirty
/// days before `today` planned out.
pub fn plan_team<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Vec<PlannedEmployee> {
    let mut emails = HashSet::new();
    let mut team = Vec::with_capacity(EMPLOYEE_COUNT);

    while team.len() < EMPLOYEE_COUNT {
        let first = pick(rng, &FIRST_NAMES);
        let last = pick(rng, &LAST_NAMES);
        let email = format!(
            "{}.{}{}@company.com",
            first.to_lowercase(),
            last.to_lowercase(),
            rng.gen_range(0..100)
        );
        if !emails.insert(email.clone()) {
            continue;
        }

        let days = (1..=HISTORY_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .filter(|d| is_working_day(*d))
            .filter_map(|d| plan_day(rng, d))
            .collect();

        team.push(PlannedEmployee {
            name: format!("{} {}", first, last),
            email,
            department: pick(rng, &DEPARTMENTS),
            days,
        });
    }
    team
}

fn local_at(date: NaiveDate, time: NaiveTime, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    date.and_time(time).and_local_timezone(*offset).single()
}

/// Fill an empty store with a manager, a team and their recent history.
pub async fn seed_demo_data(
    store: &dyn Store,
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<SeedReport> {
    let team = plan_team(&mut rand::thread_rng(), today);
    let mut report = SeedReport::default();

    let manager_hash = hash_password(MANAGER_PASSWORD).map_err(|e| anyhow!("{}", e))?;
    let employee_hash = hash_password(EMPLOYEE_PASSWORD).map_err(|e| anyhow!("{}", e))?;

    store
        .create_employee(NewEmployee {
            employee_id: employee_code(store.count_employees().await?),
            name: "Kavya Menon".into(),
            email: MANAGER_EMAIL.into(),
            department: Some("Management".into()),
            role: Role::Manager,
            password_hash: manager_hash,
        })
        .await?;
    report.employees += 1;

    for member in &team {
        let employee = store
            .create_employee(NewEmployee {
                employee_id: employee_code(store.count_employees().await?),
                name: member.name.clone(),
                email: member.email.clone(),
                department: Some(member.department.to_string()),
                role: Role::Employee,
                password_hash: employee_hash.clone(),
            })
            .await?;
        report.employees += 1;

        for day in &member.days {
            let (Some(check_in), Some(check_out)) = (
                local_at(day.date, day.check_in, &offset),
                local_at(day.date, day.check_out, &offset),
            ) else {
                continue;
            };
            let check_in_status = classify_check_in(&check_in);
            let record = store
                .insert_check_in(NewCheckIn {
                    employee_ref: employee.id,
                    date: day.date,
                    check_in_time: check_in.with_timezone(&Utc),
                    status: check_in_status,
                })
                .await?;

            let (status, total_hours) = classify_check_out(
                check_in.with_timezone(&Utc),
                check_out.with_timezone(&Utc),
                check_in_status,
            );
            store
                .close_record(
                    record.id,
                    &CheckOutUpdate {
                        check_out_time: check_out.with_timezone(&Utc),
                        status,
                        total_hours,
                    },
                )
                .await?;
            report.records += 1;
        }
    }

    info!(
        employees = report.employees,
        records = report.records,
        "Seeded demo data"
    );
    info!("Manager login: {} / {}", MANAGER_EMAIL, MANAGER_PASSWORD);
    for member in team.iter().take(3) {
        info!("Employee login: {} / {}", member.email, EMPLOYEE_PASSWORD);
    }
    Ok(report)
}
