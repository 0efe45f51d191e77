use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, http::header::HeaderMap, web::Data,
};
use futures::future::{Ready, ready};

use crate::{auth::jwt::verify_token, config::Config, error::AppError, model::role::Role};

pub const NO_TOKEN: &str = "Not authorized, no token";
pub const BAD_TOKEN: &str = "Not authorized, token failed";
pub const MANAGER_ONLY: &str = "Access denied. Manager role required";

/// The caller, as proven by their bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: u64,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.role == Role::Manager {
            Ok(())
        } else {
            Err(AppError::Forbidden(MANAGER_ONLY.into()))
        }
    }
}

/// Verify the `Authorization: Bearer` header.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<AuthUser, AppError> {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.into()))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        tracing::info!(error = %e, "rejected bearer token");
        AppError::Unauthorized(BAD_TOKEN.into())
    })?;

    Ok(AuthUser {
        employee_id: claims.sub,
        name: claims.name,
        role: claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(AppError::internal("Config missing from app data"))),
        };

        ready(authenticate(req.headers(), config))
    }
}
