use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{
    App,
    http::{StatusCode, header},
    test::{self, TestRequest},
    web,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};

use crate::{
    attendance::export::HEADER,
    auth::{
        auth::{BAD_TOKEN, MANAGER_ONLY, NO_TOKEN},
        jwt::generate_access_token,
        password::hash_password,
    },
    config::Config,
    model::{
        attendance::{CheckOutUpdate, NewCheckIn, Status},
        employee::{Employee, NewEmployee, employee_code},
        role::Role,
    },
    routes::{self, Limiters},
    store::{MemoryStore, Store},
    utils::{
        clock::{Clock, FixedClock},
        email_index::EmailIndex,
    },
};

/// Monday, 15 minutes after the late cutoff.
const MONDAY_LATE: &str = "2024-06-03T09:45:00+05:30";

struct Ctx {
    store: Arc<dyn Store>,
    clock: Arc<FixedClock>,
    config: Config,
    limiters: Limiters,
    emails: web::Data<EmailIndex>,
}

impl Ctx {
    fn at(now: &str) -> Self {
        let config = Config::for_tests();
        let limiters = Limiters::from_config(&config).unwrap();
        Self {
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(FixedClock::at(now)),
            config,
            limiters,
            emails: web::Data::new(EmailIndex::new()),
        }
    }

    /// Creates the employee directly in the store and returns a valid token.
    async fn hire(
        &self,
        name: &str,
        email: &str,
        department: Option<&str>,
        role: Role,
    ) -> (Employee, String) {
        let existing = self.store.count_employees().await.unwrap();
        let employee = self
            .store
            .create_employee(NewEmployee {
                employee_id: employee_code(existing),
                name: name.into(),
                email: email.into(),
                department: department.map(Into::into),
                role,
                password_hash: hash_password("password123").unwrap(),
            })
            .await
            .unwrap();
        let token = generate_access_token(&employee, &self.config.jwt_secret, 3600).unwrap();
        (employee, token)
    }

    /// A finished 09:00 to 17:00 IST day.
    async fn worked(&self, employee: &Employee, date: NaiveDate, status: Status) {
        let check_in = Utc
            .from_utc_datetime(&date.and_hms_opt(3, 30, 0).unwrap());
        let record = self
            .store
            .insert_check_in(NewCheckIn {
                employee_ref: employee.id,
                date,
                check_in_time: check_in,
                status,
            })
            .await
            .unwrap();
        self.store
            .close_record(
                record.id,
                &CheckOutUpdate {
                    check_out_time: check_in + Duration::hours(8),
                    status,
                    total_hours: 8.0,
                },
            )
            .await
            .unwrap();
    }
}

macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($ctx.store.clone()))
                .app_data(web::Data::from($ctx.clock.clone() as Arc<dyn Clock>))
                .app_data(web::Data::new($ctx.config.clone()))
                .app_data($ctx.emails.clone())
                .configure(|cfg| routes::configure(cfg, &$ctx.config, &$ctx.limiters)),
        )
        .await
    };
}

/// Sends the request and returns the status with the JSON body, or `Null`
/// for a non-JSON body.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (
            status,
            serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null),
        )
    }};
}

fn peer() -> SocketAddr {
    "127.0.0.1:12345".parse().unwrap()
}

fn anonymous(req: TestRequest) -> TestRequest {
    req.peer_addr(peer())
}

fn authed(req: TestRequest, token: &str) -> TestRequest {
    req.peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

fn get(uri: &str, token: &str) -> TestRequest {
    authed(TestRequest::get().uri(uri), token)
}

fn post(uri: &str, token: &str) -> TestRequest {
    authed(TestRequest::post().uri(uri), token)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/* =========================
Auth
========================= */

#[actix_web::test]
async fn register_login_and_me() {
    let ctx = Ctx::at(MONDAY_LATE);
    let app = test_app!(ctx);

    let (status, body) = send!(
        app,
        anonymous(TestRequest::post().uri("/api/auth/register")).set_json(json!({
            "name": "Priya Sharma",
            "email": "Priya.Sharma@Company.com",
            "password": "secret1",
            "department": "Engineering"
        }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["employeeId"], "EMP001");
    assert_eq!(body["data"]["email"], "priya.sharma@company.com");
    assert_eq!(body["data"]["role"], "employee");
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());

    let (status, body) = send!(
        app,
        anonymous(TestRequest::post().uri("/api/auth/login")).set_json(json!({
            "email": "priya.sharma@company.com",
            "password": "secret1"
        }))
    );
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Full name works as the identifier too.
    let (status, _) = send!(
        app,
        anonymous(TestRequest::post().uri("/api/auth/login")).set_json(json!({
            "email": "Priya Sharma",
            "password": "secret1"
        }))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send!(app, get("/api/auth/me", &token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Priya Sharma");
    assert_eq!(body["data"]["department"], "Engineering");
    assert!(body["data"].get("passwordHash").is_none());
}

#[actix_web::test]
async fn register_rejects_bad_input_and_duplicates() {
    let ctx = Ctx::at(MONDAY_LATE);
    let app = test_app!(ctx);
    let register = |body: Value| anonymous(TestRequest::post().uri("/api/auth/register")).set_json(body);

    let (status, body) = send!(
        app,
        register(json!({"name": "A", "email": "a@company.com", "password": "12345"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send!(
        app,
        register(json!({"name": "A", "email": "not-an-email", "password": "123456"}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        register(json!({"name": "A", "email": "a@company.com", "password": "123456"}))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(
        app,
        register(json!({"name": "B", "email": "A@company.com", "password": "123456"}))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[actix_web::test]
async fn login_failures() {
    let ctx = Ctx::at(MONDAY_LATE);
    ctx.hire("Asha", "asha@company.com", None, Role::Employee).await;
    let app = test_app!(ctx);
    let login = |body: Value| anonymous(TestRequest::post().uri("/api/auth/login")).set_json(body);

    let (status, body) = send!(app, login(json!({"email": "asha@company.com"})));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide email/username and password");

    let (status, body) = send!(
        app,
        login(json!({"email": "asha@company.com", "password": "wrong"}))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = send!(
        app,
        login(json!({"email": "nobody@company.com", "password": "password123"}))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn protected_routes_need_a_valid_token() {
    let ctx = Ctx::at(MONDAY_LATE);
    let app = test_app!(ctx);

    let (status, body) = send!(app, anonymous(TestRequest::get().uri("/api/attendance/today")));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], NO_TOKEN);

    let (status, body) = send!(app, get("/api/dashboard/employee", "garbage"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], BAD_TOKEN);

    let (status, _) = send!(app, anonymous(TestRequest::get().uri("/api/health")));
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn profile_update() {
    let ctx = Ctx::at(MONDAY_LATE);
    let (_, token) = ctx
        .hire("Asha", "asha@company.com", Some("Engineering"), Role::Employee)
        .await;
    let app = test_app!(ctx);

    let (status, body) = send!(
        app,
        authed(TestRequest::put().uri("/api/auth/profile"), &token)
            .set_json(json!({"name": "  "}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name cannot be empty");

    let (status, body) = send!(
        app,
        authed(TestRequest::put().uri("/api/auth/profile"), &token)
            .set_json(json!({"department": "Design"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Asha");
    assert_eq!(body["data"]["department"], "Design");
}

/* =========================
Check-in / check-out
========================= */

#[actix_web::test]
async fn late_check_in_then_short_day_stays_late() {
    let ctx = Ctx::at(MONDAY_LATE);
    let (_, token) = ctx.hire("Asha", "asha@company.com", None, Role::Employee).await;
    let app = test_app!(ctx);

    let (status, body) = send!(app, post("/api/attendance/checkin", &token));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "late");
    assert_eq!(body["data"]["date"], "2024-06-03");
    let first_check_in = body["data"]["checkInTime"].clone();

    ctx.clock.set("2024-06-03T10:30:00+05:30");
    let (status, body) = send!(app, post("/api/attendance/checkin", &token));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Already checked in today");

    let (_, body) = send!(app, get("/api/attendance/today", &token));
    assert_eq!(body["data"]["checkInTime"], first_check_in);

    ctx.clock.set("2024-06-03T11:00:00+05:30");
    let (status, body) = send!(app, post("/api/attendance/checkout", &token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalHours"], 1.25);
    assert_eq!(body["data"]["status"], "late");

    let (status, body) = send!(app, post("/api/attendance/checkout", &token));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Already checked out today");
}

#[actix_web::test]
async fn on_time_short_day_becomes_half_day() {
    let ctx = Ctx::at("2024-06-03T09:30:00+05:30");
    let (_, token) = ctx.hire("Asha", "asha@company.com", None, Role::Employee).await;
    let app = test_app!(ctx);

    let (_, body) = send!(app, post("/api/attendance/checkin", &token));
    assert_eq!(body["data"]["status"], "present");

    ctx.clock.set("2024-06-03T12:30:00+05:30");
    let (status, body) = send!(app, post("/api/attendance/checkout", &token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "half-day");
    assert_eq!(body["data"]["totalHours"], 3.0);
}

#[actix_web::test]
async fn check_out_without_check_in() {
    let ctx = Ctx::at(MONDAY_LATE);
    let (_, token) = ctx.hire("Asha", "asha@company.com", None, Role::Employee).await;
    let app = test_app!(ctx);

    let (status, body) = send!(app, post("/api/attendance/checkout", &token));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "You have not checked in today");
}

#[actix_web::test]
async fn today_without_record_is_a_placeholder() {
    let ctx = Ctx::at(MONDAY_LATE);
    let (_, token) = ctx.hire("Asha", "asha@company.com", None, Role::Employee).await;
    let app = test_app!(ctx);

    let (status, body) = send!(app, get("/api/attendance/today", &token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"status": "not-checked-in", "date": "2024-06-03"})
    );
}

/* =========================
History and summaries
========================= */

#[actix_web::test]
async fn history_is_paged_newest_first() {
    let ctx = Ctx::at(MONDAY_LATE);
    let (asha, token) = ctx.hire("Asha", "asha@company.com", None, Role::Employee).await;
    for d in 27..=31 {
        ctx.worked(&asha, day(2024, 5, d), Status::Present).await;
    }
    let app = test_app!(ctx);

    let (status, body) = send!(app, get("/api/attendance/my-history?page=2&limit=2", &token));
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2024-05-29", "2024-05-28"]);
    assert_eq!(body["pagination"], json!({"page": 2, "limit": 2, "total": 5}));

    let (_, body) = send!(app, get("/api/attendance/my-history?month=4&year=2024", &token));
    assert_eq!(body["pagination"]["total"], 0);

    // A month without a year is ignored.
    let (_, body) = send!(app, get("/api/attendance/my-history?month=4", &token));
    assert_eq!(body["pagination"]["total"], 5);

    let (status, body) = send!(app, get("/api/attendance/my-history?month=13&year=2024", &token));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid month or year");
}

#[actix_web::test]
async fn huge_page_numbers_return_an_empty_page() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    let (status, body) = send!(
        app,
        get(
            "/api/attendance/my-history?page=18446744073709551615&limit=100",
            &team.asha_token
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["total"], 2);

    let (status, body) = send!(
        app,
        get("/api/attendance/all?page=18446744073709551615", &team.manager)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn my_summary_counts_implicit_absences() {
    let ctx = Ctx::at(MONDAY_LATE);
    let (asha, token) = ctx.hire("Asha", "asha@company.com", None, Role::Employee).await;
    for d in 27..=31 {
        ctx.worked(&asha, day(2024, 5, d), Status::Present).await;
    }
    let app = test_app!(ctx);

    // June 3rd is the first working day of June.
    let (status, body) = send!(app, get("/api/attendance/my-summary", &token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["present"], 0);
    assert_eq!(body["data"]["absent"], 1);
    assert_eq!(body["data"]["workingDays"], 1);

    let (_, body) = send!(app, get("/api/attendance/my-summary?month=5&year=2024", &token));
    assert_eq!(body["data"]["present"], 5);
    assert_eq!(body["data"]["totalDays"], 5);
    assert_eq!(body["data"]["workingDays"], 23);
    assert_eq!(body["data"]["absent"], 18);
    assert_eq!(body["data"]["totalHours"], 40.0);

    let (_, body) = send!(app, get("/api/attendance/my-summary?month=7&year=2024", &token));
    assert_eq!(body["data"]["absent"], 0);
}

/* =========================
Manager views
========================= */

struct Team {
    manager: String,
    asha: Employee,
    asha_token: String,
    ravi: Employee,
}

async fn team(ctx: &Ctx) -> Team {
    let (_, manager) = ctx
        .hire("Maya", "manager@company.com", None, Role::Manager)
        .await;
    let (asha, asha_token) = ctx
        .hire("Asha Rao", "asha@company.com", Some("Engineering"), Role::Employee)
        .await;
    let (ravi, _) = ctx
        .hire("Ravi Kumar", "ravi@company.com", Some("Sales"), Role::Employee)
        .await;
    ctx.worked(&asha, day(2024, 5, 28), Status::Present).await;
    ctx.worked(&asha, day(2024, 5, 29), Status::Late).await;
    ctx.worked(&ravi, day(2024, 5, 28), Status::HalfDay).await;
    Team {
        manager,
        asha,
        asha_token,
        ravi,
    }
}

#[actix_web::test]
async fn manager_routes_reject_employees() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    for uri in [
        "/api/attendance/all",
        "/api/attendance/summary",
        "/api/attendance/today-status",
        "/api/attendance/export",
        "/api/dashboard/manager",
    ] {
        let (status, body) = send!(app, get(uri, &team.asha_token));
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["message"], MANAGER_ONLY);
    }
}

#[actix_web::test]
async fn all_records_with_filters() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    let (status, body) = send!(app, get("/api/attendance/all", &team.manager));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["data"][0]["date"], "2024-05-29");
    assert_eq!(body["data"][0]["employee"]["name"], "Asha Rao");

    let (_, body) = send!(app, get("/api/attendance/all?department=ENG", &team.manager));
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = send!(app, get("/api/attendance/all?employee=ravi", &team.manager));
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["status"], "half-day");

    let uri = format!("/api/attendance/all?employeeId={}", team.ravi.id);
    let (_, body) = send!(app, get(&uri, &team.manager));
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = send!(app, get("/api/attendance/all?status=late", &team.manager));
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = send!(app, get("/api/attendance/all?date=2024-05-28", &team.manager));
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = send!(
        app,
        get(
            "/api/attendance/all?startDate=2024-05-29&endDate=2024-05-31",
            &team.manager
        )
    );
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = send!(app, get("/api/attendance/all?employee=nobody", &team.manager));
    assert_eq!(body["pagination"]["total"], 0);

    let (status, _) = send!(app, get("/api/attendance/all?employeeId=abc", &team.manager));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn employee_attendance_by_id() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    let uri = format!("/api/attendance/employee/{}", team.asha.id);
    let (status, body) = send!(app, get(&uri, &team.manager));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["employee"]["email"], "asha@company.com");
    assert_eq!(body["data"]["attendance"].as_array().unwrap().len(), 2);

    let (status, body) = send!(app, get("/api/attendance/employee/999", &team.manager));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Employee not found");
}

#[actix_web::test]
async fn team_and_department_summaries() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    let (status, body) = send!(
        app,
        get("/api/attendance/summary?month=5&year=2024", &team.manager)
    );
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    // The manager is not part of the roster.
    assert_eq!(rows.len(), 2);
    let asha = rows
        .iter()
        .find(|r| r["employee"]["name"] == "Asha Rao")
        .unwrap();
    assert_eq!(asha["present"], 1);
    assert_eq!(asha["late"], 1);
    assert_eq!(asha["absent"], 21);

    let (_, body) = send!(
        app,
        get("/api/attendance/department-summary?month=5&year=2024", &team.manager)
    );
    let departments: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["department"].as_str().unwrap())
        .collect();
    assert_eq!(departments, ["Engineering", "Sales"]);
    assert_eq!(body["data"][1]["halfDay"], 1);
}

#[actix_web::test]
async fn export_is_a_csv_attachment() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    let resp = test::call_service(&app, get("/api/attendance/export", &team.manager).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=attendance-report.csv"
    );
    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], HEADER.join(","));
    assert_eq!(lines.len(), 4);
    // 03:30 UTC shown at the server's +05:30 offset
    assert!(lines[1].contains("9:00:00 AM"));

    let uri = format!("/api/attendance/export?employeeId={}", team.ravi.id);
    let resp = test::call_service(&app, get(&uri, &team.manager).to_request()).await;
    let body = test::read_body(resp).await;
    assert_eq!(std::str::from_utf8(&body).unwrap().lines().count(), 2);
}

#[actix_web::test]
async fn today_status_covers_the_roster() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    let (_, _) = send!(app, post("/api/attendance/checkin", &team.asha_token));
    let (status, body) = send!(app, get("/api/attendance/today-status", &team.manager));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["summary"],
        json!({"present": 1, "absent": 1, "late": 1, "total": 2})
    );
    let ravi = body["data"]["employees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["employee"]["name"] == "Ravi Kumar")
        .unwrap();
    assert_eq!(ravi["status"], "absent");
}

/* =========================
Dashboards
========================= */

#[actix_web::test]
async fn employee_dashboard_shows_the_week() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    let (status, body) = send!(app, get("/api/dashboard/employee", &team.asha_token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["today"]["status"], "not-checked-in");
    assert_eq!(body["data"]["monthly"]["absent"], 1);

    let week = body["data"]["recentAttendance"].as_array().unwrap();
    assert_eq!(week.len(), 7);
    // 28 May .. 3 June
    assert_eq!(week[0]["date"], "2024-05-28");
    assert_eq!(week[0]["status"], "present");
    assert_eq!(week[1]["status"], "late");
    assert_eq!(week[2]["status"], "absent");
    assert_eq!(week[4]["status"], "weekend");
    assert_eq!(week[6]["dayName"], "Mon");
}

#[actix_web::test]
async fn manager_dashboard_shows_the_team() {
    let ctx = Ctx::at(MONDAY_LATE);
    let team = team(&ctx).await;
    let app = test_app!(ctx);

    send!(app, post("/api/attendance/checkin", &team.asha_token));
    let (status, body) = send!(app, get("/api/dashboard/manager", &team.manager));
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["totalEmployees"], 2);
    assert_eq!(data["todayStats"], json!({"present": 1, "absent": 1, "late": 1}));
    assert_eq!(data["absentEmployees"][0]["name"], "Ravi Kumar");
    assert_eq!(data["weeklyTrend"].as_array().unwrap().len(), 7);
    assert_eq!(data["weeklyTrend"][0]["present"], 2);
    assert_eq!(data["departmentStats"].as_array().unwrap().len(), 2);
}
