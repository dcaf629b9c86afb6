use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, test, web};
use chrono_tz::Africa::Lagos;
use rollcall::config::{AttendanceMode, Config, StoreBackend};
use rollcall::engine::groups::SessionGroups;
use rollcall::engine::window::WindowSchedule;
use rollcall::engine::AttendanceEngine;
use rollcall::store::MemoryStore;
use tracing::Level;

/// Windows that cover the whole day, so check-ins never depend on when tests run.
pub const ALWAYS_OPEN: &str = "00:00-23:59";

pub fn test_config(mode: AttendanceMode, windows: &str) -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        api_prefix: "/api".to_string(),
        mode,
        timezone: Lagos,
        windows: WindowSchedule::parse(windows).expect("test windows"),
        session_groups: SessionGroups::parse("morning:Class1,Class2;evening:Class3,Class4")
            .expect("test groups"),
        static_dir: "does-not-exist".to_string(),
        log_dir: "logs".to_string(),
        log_level: Level::DEBUG,
        rate_checkin_per_min: 1000,
        rate_register_per_min: 1000,
        rate_query_per_min: 1000,
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub engine: AttendanceEngine,
    pub config: Config,
}

impl TestContext {
    pub fn new(config: Config) -> TestContext {
        let store = Arc::new(MemoryStore::new());
        let engine = AttendanceEngine::new(store.clone(), config.engine_settings());
        TestContext {
            store,
            engine,
            config,
        }
    }

    pub fn window_mode() -> TestContext {
        Self::new(test_config(AttendanceMode::Window, ALWAYS_OPEN))
    }

    pub fn group_mode() -> TestContext {
        Self::new(test_config(AttendanceMode::Group, ALWAYS_OPEN))
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let config = self.config.clone();
        App::new()
            .app_data(web::Data::new(self.engine.clone()))
            .app_data(web::Data::from(
                self.store.clone() as Arc<dyn rollcall::store::AttendanceStore>
            ))
            .configure(move |cfg| rollcall::routes::configure(cfg, &config))
    }
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().expect("peer address")
}

/// Requests carry a peer address because the rate limiter keys on it.
#[allow(dead_code)]
pub fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).peer_addr(peer())
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .peer_addr(peer())
        .set_json(body)
}

#[allow(dead_code)]
pub fn registration(name: &str, email: &str, phone: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "phone": phone,
        "email": email,
        "location": "Lagos"
    })
}
