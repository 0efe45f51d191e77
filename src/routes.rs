use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, middleware::from_fn, web};
use anyhow::{Result, anyhow};
use serde_json::json;

use crate::{
    api::{attendance, dashboard},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};

type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route-group rate limits. Built once so every worker shares the same
/// buckets.
#[derive(Clone)]
pub struct Limiters {
    pub login: LimiterConfig,
    pub register: LimiterConfig,
    pub protected: LimiterConfig,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min)?,
            register: build_limiter(config.rate_register_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {} per minute", requests_per_min))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "success": true, "message": "API is running" }))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Malformed bodies, queries and paths get the same JSON error shape as
    // everything else.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .route("/health", web::get().to(health))
            // Public auth, plus the two self-service profile routes
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/login")
                            .wrap(Governor::new(&limiters.login))
                            .route(web::post().to(handlers::login)),
                    )
                    .service(
                        web::resource("/register")
                            .wrap(Governor::new(&limiters.register))
                            .route(web::post().to(handlers::register)),
                    )
                    .service(
                        web::resource("/me")
                            .wrap(from_fn(auth_middleware))
                            .wrap(Governor::new(&limiters.protected))
                            .route(web::get().to(handlers::me)),
                    )
                    .service(
                        web::resource("/profile")
                            .wrap(from_fn(auth_middleware))
                            .wrap(Governor::new(&limiters.protected))
                            .route(web::put().to(handlers::update_profile)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .wrap(from_fn(auth_middleware)) // authentication
                    .wrap(Governor::new(&limiters.protected)) // rate limiting
                    .route("/checkin", web::post().to(attendance::check_in))
                    .route("/checkout", web::post().to(attendance::check_out))
                    .route("/today", web::get().to(attendance::today))
                    .route("/my-history", web::get().to(attendance::my_history))
                    .route("/my-summary", web::get().to(attendance::my_summary))
                    // manager only
                    .route("/all", web::get().to(attendance::all))
                    .route(
                        "/employee/{id}",
                        web::get().to(attendance::employee_attendance),
                    )
                    .route("/summary", web::get().to(attendance::team_summary))
                    .route(
                        "/department-summary",
                        web::get().to(attendance::department_summary),
                    )
                    .route("/export", web::get().to(attendance::export))
                    .route("/today-status", web::get().to(attendance::today_status)),
            )
            .service(
                web::scope("/dashboard")
                    .wrap(from_fn(auth_middleware))
                    .wrap(Governor::new(&limiters.protected))
                    .route("/employee", web::get().to(dashboard::employee))
                    .route("/manager", web::get().to(dashboard::manager)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_clamped_instead_of_failing() {
        assert!(build_limiter(0).is_ok());
        assert!(build_limiter(1000).is_ok());
        assert!(build_limiter(120_000).is_ok());
    }
}
