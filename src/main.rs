use std::path::Path;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;
use rollcall::config::Config;
use rollcall::db::init_store;
use rollcall::docs::openapi_for;
use rollcall::engine::AttendanceEngine;
use rollcall::routes;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "rollcall.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        mode = %config.mode,
        backend = %config.store_backend,
        timezone = %config.timezone,
        "Server starting..."
    );

    let store = init_store(&config).await?;
    let engine = AttendanceEngine::new(store.clone(), config.engine_settings());
    let openapi = openapi_for(config.mode);

    let serve_static = Path::new(&config.static_dir).is_dir();
    if !serve_static {
        warn!(static_dir = %config.static_dir, "Static site directory missing, not serving it");
    }

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(Data::new(engine.clone()))
            .app_data(Data::from(store.clone()))
            .configure(|cfg| routes::configure(cfg, &config));

        if serve_static {
            app.service(routes::static_site(&config.static_dir))
        } else {
            app
        }
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
