use crate::{
    api::{attendance, check_in, user},
    config::{AttendanceMode, Config},
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_files::{Files, NamedFile};
use actix_web::{
    dev::{ServiceRequest, ServiceResponse, fn_service},
    web,
};
use std::{path::Path, sync::Arc};

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let checkin_limiter = Arc::new(build_limiter(config.rate_checkin_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let query_limiter = Arc::new(build_limiter(config.rate_query_per_min));

    // malformed bodies and query strings get the same JSON error shape as handler errors
    let scope = web::scope(&config.api_prefix)
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            AppError::Validation(err.to_string()).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            AppError::Validation(err.to_string()).into()
        }));

    let scope = match config.mode {
        AttendanceMode::Window => scope
            // /login/{role}
            .service(
                web::resource("/login/{role}")
                    .wrap(checkin_limiter.clone())
                    .route(web::post().to(check_in::login)),
            )
            // /register
            .service(
                web::resource("/register")
                    .wrap(checkin_limiter.clone())
                    .route(web::post().to(check_in::register)),
            )
            // /registerr
            .service(
                web::resource("/registerr")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(user::register_only)),
            )
            .service(
                web::resource("/attendance")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(check_in::attendance_list)),
            )
            .service(
                web::resource("/attendees")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(check_in::attendees)),
            )
            .service(
                web::resource("/users")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(user::list_users)),
            ),

        AttendanceMode::Group => scope
            // /register
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(user::register_user)),
            )
            // /user/{email}
            .service(
                web::resource("/user/{email}")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(user::get_user)),
            )
            // /mark-attendance
            .service(
                web::resource("/mark-attendance")
                    .wrap(checkin_limiter.clone())
                    .route(web::post().to(attendance::mark_attendance)),
            )
            // /session/{session}
            .service(
                web::resource("/session/{session}")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(attendance::session_attendance)),
            )
            // /users?type=registered|attendees
            .service(
                web::resource("/users")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(user::list_users_by_type)),
            ),
    };

    cfg.service(scope);
}

/// Serves the prebuilt single-page site, answering unknown paths with its
/// `index.html` so client-side routes load.
pub fn static_site(static_dir: &str) -> Files {
    let index = Path::new(static_dir).join("index.html");

    Files::new("/", static_dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(&index).await?;
                let res = file.into_response(&req);
                Ok(ServiceResponse::new(req, res))
            }
        }))
}
