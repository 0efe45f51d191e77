use actix_web::{HttpResponse, web};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_access_token,
        password::{MIN_PASSWORD_LEN, hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::employee::{Employee, NewEmployee, employee_code},
    models::{ApiResponse, AuthData, LoginReqDto, ProfileUpdate, RegisterReq},
    store::{DUPLICATE_EMAIL, Store},
    utils::email_index::EmailIndex,
};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn issue_token(employee: &Employee, config: &Config) -> Result<String, AppError> {
    generate_access_token(employee, &config.jwt_secret, config.access_token_ttl)
        .map_err(AppError::internal)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Registered; body carries the new user and a token", body = AuthData),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip_all)]
pub async fn register(
    req: web::Json<RegisterReq>,
    store: web::Data<dyn Store>,
    emails: web::Data<EmailIndex>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Please provide name, email and password"));
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::validation("Please provide a valid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if emails
        .is_registered(store.get_ref(), &email)
        .await
        .map_err(AppError::internal)?
    {
        info!("email already registered");
        return Err(AppError::conflict(DUPLICATE_EMAIL));
    }

    let existing = store.count_employees().await?;
    let password_hash = hash_password(&req.password).map_err(AppError::internal)?;
    let employee = store
        .create_employee(NewEmployee {
            employee_id: employee_code(existing),
            name,
            email,
            department: req
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            role: req.role.unwrap_or_default(),
            password_hash,
        })
        .await?;
    emails.mark_taken(&employee.email).await;

    info!(employee_id = employee.id, code = %employee.employee_id, "employee registered");
    let token = issue_token(&employee, &config)?;
    Ok(ApiResponse::created(AuthData::new(employee, token)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = AuthData),
        (status = 400, description = "Missing identifier or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip_all)]
pub async fn login(
    req: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");
    let identifier = req.email.trim();
    if identifier.is_empty() || req.password.is_empty() {
        return Err(AppError::validation(
            "Please provide email/username and password",
        ));
    }

    debug!("looking up employee");
    let employee = match store.find_employee_by_email(identifier).await? {
        Some(e) => Some(e),
        None => store.find_employee_by_name(identifier).await?,
    };
    let Some(employee) = employee else {
        info!("Invalid credentials: no such employee");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&req.password, &employee.password_hash) {
        info!(employee_id = employee.id, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    info!(employee_id = employee.id, "Login successful");
    let token = issue_token(&employee, &config)?;
    Ok(ApiResponse::ok(AuthData::new(employee, token)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The caller's profile", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let employee = store
        .find_employee(auth.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(ApiResponse::ok(employee))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = Employee),
        (status = 400, description = "Empty name"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
#[instrument(skip_all, fields(employee_id = auth.employee_id))]
pub async fn update_profile(
    auth: AuthUser,
    req: web::Json<ProfileUpdate>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let name = req.name.map(|n| n.trim().to_string());
    if name.as_deref().is_some_and(str::is_empty) {
        return Err(AppError::validation("Name cannot be empty"));
    }
    let department = req.department.map(|d| d.trim().to_string());

    let employee = store
        .update_profile(auth.employee_id, name, department)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!("profile updated");
    Ok(ApiResponse::ok(employee))
}
