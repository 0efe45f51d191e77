use actix_web::{HttpResponse, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{employee::Employee, role::Role};

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Priya Sharma")]
    pub name: String,
    #[schema(example = "priya.sharma@company.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    pub role: Option<Role>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    /// Email address, or the employee's full name.
    #[schema(example = "priya.sharma@company.com")]
    #[serde(default)]
    pub email: String,
    #[schema(example = "password123")]
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ProfileUpdate {
    #[schema(example = "Priya S.")]
    pub name: Option<String>,
    #[schema(example = "Design")]
    pub department: Option<String>,
}

/// Returned by register and login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub employee_id: String,
    pub department: Option<String>,
    pub token: String,
}

impl AuthData {
    pub fn new(employee: Employee, token: String) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
            email: employee.email,
            role: employee.role,
            employee_id: employee.employee_id,
            department: employee.department,
            token,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id.
    pub sub: u64,
    pub name: String,
    pub role: Role,
    pub exp: u64,
    pub jti: String,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Pagination {
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 20)]
    pub limit: u64,
    #[schema(example = 57)]
    pub total: u64,
}

/// Success envelope: `{"success": true, "data": ..., "pagination"?: ...}`.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> HttpResponse {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> HttpResponse {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn paged(data: T, pagination: Pagination) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse {
            success: true,
            data,
            pagination: Some(pagination),
        })
    }

    fn with_status(status: StatusCode, data: T) -> HttpResponse {
        HttpResponse::build(status).json(ApiResponse {
            success: true,
            data,
            pagination: None,
        })
    }
}
