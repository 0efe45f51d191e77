use std::io;
use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod seed;
mod store;
mod utils;

use config::Config;
use db::init_store;
use routes::Limiters;

use crate::docs::ApiDoc;
use crate::store::Store;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::email_index::EmailIndex;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const EMAIL_WARMUP_BATCH: usize = 250;

fn startup_error(err: anyhow::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("{:#}", err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = Config::from_env().map_err(startup_error)?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let limiters = Limiters::from_config(&config).map_err(startup_error)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (store, in_memory): (Arc<dyn Store>, bool) = init_store(&config).await;

    if in_memory && config.seed_demo_data {
        let now = clock.now();
        if let Err(e) = seed::seed_demo_data(store.as_ref(), now.date_naive(), *now.offset()).await
        {
            warn!(error = %format!("{:#}", e), "Failed to seed demo data");
        }
    }

    let emails = Data::new(EmailIndex::new());
    let store_for_warmup = store.clone();
    let emails_for_warmup = emails.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = emails_for_warmup
            .warmup(store_for_warmup.as_ref(), EMAIL_WARMUP_BATCH)
            .await
        {
            warn!(error = %e, "Failed to warmup email index");
        }
    });

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, in_memory, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS and CSS assets match
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::from(store.clone()))
            .app_data(Data::from(clock.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(emails.clone())
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await
}
