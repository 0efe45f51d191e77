use actix_web::{HttpResponse, web};
use chrono::Datelike;

use crate::{
    attendance::{
        calendar::month_range,
        dashboard::{employee_dashboard, manager_dashboard, window_start},
    },
    auth::auth::AuthUser,
    error::AppError,
    models::ApiResponse,
    store::{AttendanceFilter, EmployeeFilter, Store},
    utils::clock::Clock,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/employee",
    responses(
        (status = 200, description = "Today, this month and the last seven days", body = EmployeeDashboard),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn employee(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    let today = clock.today();
    let (first, last) = month_range(today.year(), today.month())
        .ok_or_else(|| AppError::internal(format!("no month range for {}", today)))?;

    let own = AttendanceFilter::for_employee(auth.employee_id);
    let today_record = store.find_record(auth.employee_id, today).await?;
    let month = store
        .list_records(&own.clone().between(first, last), None)
        .await?;
    let recent = store
        .list_records(&own.between(window_start(today), today), None)
        .await?;

    Ok(ApiResponse::ok(employee_dashboard(
        today,
        today_record,
        &month,
        &recent,
    )))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/manager",
    responses(
        (status = 200, description = "Team-wide view of today and the last seven days", body = ManagerDashboard),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn manager(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    auth.require_manager()?;
    let today = clock.today();

    let roster = store.list_employees(&EmployeeFilter::roster()).await?;
    let week = store
        .list_records(
            &AttendanceFilter::default().between(window_start(today), today),
            None,
        )
        .await?;

    Ok(ApiResponse::ok(manager_dashboard(today, &roster, &week)))
}
