use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
};

use crate::{auth::auth::authenticate, config::Config, error::AppError};

/// Rejects the request with 401 unless it carries a valid bearer token;
/// otherwise stores the `AuthUser` in the request extensions.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = match req.app_data::<Data<Config>>() {
        Some(c) => c.clone(),
        None => {
            let resp = AppError::internal("Config missing from app data").error_response();
            return Ok(req.into_response(resp));
        }
    };

    match authenticate(req.headers(), &config) {
        Ok(user) => {
            tracing::debug!(
                employee_id = user.employee_id,
                name = %user.name,
                role = %user.role,
                "authenticated"
            );
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(err) => Ok(req.into_response(err.error_response())),
    }
}
