use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::attendance::{EmployeeAttendance, RecordWithEmployee};
use crate::attendance::dashboard::{
    DayStatus, DepartmentToday, EmployeeDashboard, ManagerDashboard, NotCheckedIn, RosterEntry,
    TodayCounts, TodayRecord, TodayStats, TodayStatus, TrendDay,
};
use crate::attendance::summary::{DepartmentSummary, EmployeeSummary, Summary};
use crate::model::attendance::{AttendanceRecord, Status};
use crate::model::employee::Employee;
use crate::model::role::Role;
use crate::models::{AuthData, LoginReqDto, Pagination, ProfileUpdate, RegisterReq};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

Daily check-in and check-out for employees, with team-wide reporting for managers.

### 🔹 Key Features
- **Self-service**
  - Check in, check out, today's record, own history and monthly summary
- **Manager views**
  - Filtered attendance lists, per-employee and per-department summaries
  - Today's roster status and CSV export
- **Dashboards**
  - Personal week view and a team-wide daily overview

### 🔐 Security
Everything except register, login and health requires a **JWT Bearer** token.
Manager views additionally require the `manager` role.

### 📦 Response Format
- `{"success": true, "data": ...}` on success, plus `pagination` for list endpoints
- `{"success": false, "message": ...}` on failure

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::me,
        crate::auth::handlers::update_profile,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,
        crate::api::attendance::my_history,
        crate::api::attendance::my_summary,
        crate::api::attendance::all,
        crate::api::attendance::employee_attendance,
        crate::api::attendance::team_summary,
        crate::api::attendance::department_summary,
        crate::api::attendance::export,
        crate::api::attendance::today_status,

        crate::api::dashboard::employee,
        crate::api::dashboard::manager
    ),
    components(
        schemas(
            Role,
            Employee,
            Status,
            AttendanceRecord,
            RegisterReq,
            LoginReqDto,
            ProfileUpdate,
            AuthData,
            Pagination,
            Summary,
            EmployeeSummary,
            DepartmentSummary,
            RecordWithEmployee,
            EmployeeAttendance,
            NotCheckedIn,
            TodayRecord,
            DayStatus,
            EmployeeDashboard,
            RosterEntry,
            TodayCounts,
            TodayStatus,
            TodayStats,
            TrendDay,
            DepartmentToday,
            ManagerDashboard
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and own profile"),
        (name = "Attendance", description = "Check-in, history and manager reporting"),
        (name = "Dashboard", description = "Aggregated home screens"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
