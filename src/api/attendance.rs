use std::collections::BTreeSet;

use actix_web::{HttpResponse, http::header, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    attendance::{
        calendar::{month_range, passed_working_days, year_range},
        dashboard::{TodayRecord, today_roster},
        export::{ExportRow, to_delimited_text},
        status::{InvalidState, classify_check_in, plan_check_out},
        summary::{summarize, summarize_by_department, summarize_roster},
    },
    auth::auth::AuthUser,
    error::AppError,
    model::{
        attendance::{AttendanceRecord, NewCheckIn, Status},
        employee::Employee,
    },
    models::{ApiResponse, Pagination},
    store::{AttendanceFilter, DUPLICATE_CHECK_IN, EmployeeFilter, Page, Store},
    utils::clock::Clock,
};

pub const HISTORY_LIMIT: u64 = 31;
pub const LIST_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// 1–12; only applied together with `year`
    pub month: Option<u32>,
    /// Alone, filters the whole year
    pub year: Option<i32>,
    pub page: Option<u64>,
    /// Defaults to 31
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// Defaults to the current month
    pub month: Option<u32>,
    /// Defaults to the current year
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct AllQuery {
    /// Exact day; takes precedence over `startDate`/`endDate`
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub status: Option<Status>,
    /// Case-insensitive substring of the employee name
    pub employee: Option<String>,
    /// Numeric id, or `all`
    pub employee_id: Option<String>,
    /// Case-insensitive substring of the department
    pub department: Option<String>,
    pub page: Option<u64>,
    /// Defaults to 20
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct ExportQuery {
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    /// Numeric id, or `all`
    pub employee_id: Option<String>,
}

/// A record together with the employee it belongs to.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordWithEmployee {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub employee: Option<Employee>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeAttendance {
    pub employee: Employee,
    pub attendance: Vec<AttendanceRecord>,
}

fn page_of(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT);
    (page, limit)
}

fn month_or_invalid(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    month_range(year, month).ok_or_else(|| AppError::validation("Invalid month or year"))
}

/// `month` + `year` selects a month, `year` alone the whole year.
fn history_range(
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Option<(NaiveDate, NaiveDate)>, AppError> {
    match (month, year) {
        (Some(m), Some(y)) => month_or_invalid(y, m).map(Some),
        (None, Some(y)) => year_range(y)
            .map(Some)
            .ok_or_else(|| AppError::validation("Invalid year")),
        _ => Ok(None),
    }
}

/// Requested month, defaulting to the one `today` is in.
fn period(
    query: &PeriodQuery,
    today: NaiveDate,
) -> Result<(i32, u32, (NaiveDate, NaiveDate)), AppError> {
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    Ok((year, month, month_or_invalid(year, month)?))
}

/// `None` and `all` both mean every employee.
fn parse_employee_id(raw: Option<&str>) -> Result<Option<u64>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(id) => id
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation("Invalid employeeId")),
    }
}

async fn with_employees(
    store: &dyn Store,
    records: Vec<AttendanceRecord>,
) -> Result<Vec<RecordWithEmployee>, AppError> {
    let ids: Vec<u64> = records
        .iter()
        .map(|r| r.employee_ref)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let employees = store.employees_by_ids(&ids).await?;
    Ok(records
        .into_iter()
        .map(|record| {
            let employee = employees.iter().find(|e| e.id == record.employee_ref).cloned();
            RecordWithEmployee { record, employee }
        })
        .collect())
}

fn conflict(state: InvalidState) -> AppError {
    AppError::conflict(state.to_string())
}

/* =========================
Employee self-service
========================= */

#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 201, description = "Checked in; status is present or late", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "success": false,
            "message": "Already checked in today"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(employee_id = auth.employee_id))]
pub async fn check_in(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    let now = clock.now();
    let date = now.date_naive();

    if store.find_record(auth.employee_id, date).await?.is_some() {
        info!(%date, "rejected duplicate check-in");
        return Err(AppError::conflict(DUPLICATE_CHECK_IN));
    }

    let status = classify_check_in(&now);
    let record = store
        .insert_check_in(NewCheckIn {
            employee_ref: auth.employee_id,
            date,
            check_in_time: now.with_timezone(&Utc),
            status,
        })
        .await?;

    info!(%date, %status, "checked in");
    Ok(ApiResponse::created(record))
}

#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Checked out; hours and final status recorded", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Not checked in, or already checked out", body = Object, example = json!({
            "success": false,
            "message": "You have not checked in today"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(employee_id = auth.employee_id))]
pub async fn check_out(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    let now = clock.now();
    let date = now.date_naive();

    let record = store.find_record(auth.employee_id, date).await?;
    let update = plan_check_out(record.as_ref(), now.with_timezone(&Utc)).map_err(|state| {
        info!(%date, %state, "rejected check-out");
        conflict(state)
    })?;
    // plan_check_out only succeeds for an existing record
    let Some(record) = record else {
        return Err(conflict(InvalidState::NotCheckedIn));
    };

    let closed = store
        .close_record(record.id, &update)
        .await?
        .ok_or_else(|| {
            warn!(%date, "check-out lost a race with another check-out");
            conflict(InvalidState::AlreadyCheckedOut)
        })?;

    info!(%date, status = %closed.status, hours = closed.total_hours, "checked out");
    Ok(ApiResponse::ok(closed))
}

#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record, or a not-checked-in placeholder", body = TodayRecord),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    let today = clock.today();
    let record = store.find_record(auth.employee_id, today).await?;
    Ok(ApiResponse::ok(TodayRecord::new(record, today)))
}

#[utoipa::path(
    get,
    path = "/api/attendance/my-history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Own records, newest first, with pagination", body = [AttendanceRecord]),
        (status = 400, description = "Invalid month or year"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let mut filter = AttendanceFilter::for_employee(auth.employee_id);
    filter.range = history_range(query.month, query.year)?;
    let (page, limit) = page_of(query.page, query.limit, HISTORY_LIMIT);

    let records = store
        .list_records(&filter, Some(Page::new(page, limit)))
        .await?;
    let total = store.count_records(&filter).await?;

    Ok(ApiResponse::paged(records, Pagination { page, limit, total }))
}

#[utoipa::path(
    get,
    path = "/api/attendance/my-summary",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Own monthly summary", body = Summary),
        (status = 400, description = "Invalid month or year"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_summary(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    let today = clock.today();
    let (year, month, (from, to)) = period(&query, today)?;

    let filter = AttendanceFilter::for_employee(auth.employee_id).between(from, to);
    let records = store.list_records(&filter, None).await?;
    let passed = passed_working_days(year, month, today);

    Ok(ApiResponse::ok(summarize(&records, passed)))
}

/* =========================
Manager views
========================= */

#[utoipa::path(
    get,
    path = "/api/attendance/all",
    params(AllQuery),
    responses(
        (status = 200, description = "Filtered records with their employees, newest first", body = [RecordWithEmployee]),
        (status = 400, description = "Malformed filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn all(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<AllQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;
    let query = query.into_inner();

    let mut filter = AttendanceFilter {
        status: query.status,
        ..AttendanceFilter::default()
    };
    if let Some(date) = query.date {
        filter.date = Some(date);
    } else if let (Some(from), Some(to)) = (query.start_date, query.end_date) {
        filter.range = Some((from, to));
    }

    let employee_id = parse_employee_id(query.employee_id.as_deref())?;
    let employee_filter = EmployeeFilter {
        name_contains: query.employee.filter(|s| !s.trim().is_empty()),
        department_contains: query.department.filter(|s| !s.trim().is_empty()),
        id: employee_id,
        ..EmployeeFilter::default()
    };
    if employee_filter.name_contains.is_some()
        || employee_filter.department_contains.is_some()
        || employee_filter.id.is_some()
    {
        let matching = store.list_employees(&employee_filter).await?;
        filter.employee_refs = Some(matching.into_iter().map(|e| e.id).collect());
    }

    let (page, limit) = page_of(query.page, query.limit, LIST_LIMIT);
    let records = store
        .list_records(&filter, Some(Page::new(page, limit)))
        .await?;
    let total = store.count_records(&filter).await?;
    let rows = with_employees(store.get_ref(), records).await?;

    Ok(ApiResponse::paged(rows, Pagination { page, limit, total }))
}

#[utoipa::path(
    get,
    path = "/api/attendance/employee/{id}",
    params(
        ("id" = u64, Path, description = "Employee id"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Profile and records, newest first", body = EmployeeAttendance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn employee_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;
    let id = path.into_inner();

    let employee = store
        .find_employee(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    let mut filter = AttendanceFilter::for_employee(id);
    if let (Some(month), Some(year)) = (query.month, query.year) {
        filter.range = Some(month_or_invalid(year, month)?);
    }
    let attendance = store.list_records(&filter, None).await?;

    Ok(ApiResponse::ok(EmployeeAttendance { employee, attendance }))
}

#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(PeriodQuery),
    responses(
        (status = 200, description = "One summary per employee", body = [EmployeeSummary]),
        (status = 400, description = "Invalid month or year"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn team_summary(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;
    let today = clock.today();
    let (year, month, (from, to)) = period(&query, today)?;

    let roster = store.list_employees(&EmployeeFilter::roster()).await?;
    let records = store
        .list_records(&AttendanceFilter::default().between(from, to), None)
        .await?;
    let passed = passed_working_days(year, month, today);

    Ok(ApiResponse::ok(summarize_roster(&roster, &records, passed)))
}

#[utoipa::path(
    get,
    path = "/api/attendance/department-summary",
    params(PeriodQuery),
    responses(
        (status = 200, description = "One summary per department", body = [DepartmentSummary]),
        (status = 400, description = "Invalid month or year"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn department_summary(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;
    let today = clock.today();
    let (year, month, (from, to)) = period(&query, today)?;

    let roster = store.list_employees(&EmployeeFilter::roster()).await?;
    let records = store
        .list_records(&AttendanceFilter::default().between(from, to), None)
        .await?;
    let passed = passed_working_days(year, month, today);

    Ok(ApiResponse::ok(summarize_by_department(&roster, &records, passed)))
}

#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 400, description = "Malformed filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip_all, fields(manager_id = auth.employee_id))]
pub async fn export(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;

    let mut filter = AttendanceFilter::default();
    if let (Some(from), Some(to)) = (query.start_date, query.end_date) {
        filter.range = Some((from, to));
    }
    if let Some(id) = parse_employee_id(query.employee_id.as_deref())? {
        filter.employee_refs = Some(vec![id]);
    }

    let records = store.list_records(&filter, None).await?;
    let rows = with_employees(store.get_ref(), records).await?;
    let export_rows: Vec<ExportRow<'_>> = rows
        .iter()
        .map(|r| ExportRow {
            employee: r.employee.as_ref(),
            record: &r.record,
        })
        .collect();

    let offset = *clock.now().offset();
    let body = to_delimited_text(&export_rows, &offset).map_err(AppError::internal)?;
    info!(rows = export_rows.len(), "attendance exported");

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=attendance-report.csv",
        ))
        .body(body))
}

#[utoipa::path(
    get,
    path = "/api/attendance/today-status",
    responses(
        (status = 200, description = "Roster with today's status per employee", body = TodayStatus),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_status(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;
    let today = clock.today();

    let roster = store.list_employees(&EmployeeFilter::roster()).await?;
    let records = store.list_records(&AttendanceFilter::on(today), None).await?;

    Ok(ApiResponse::ok(today_roster(&roster, &records)))
}
