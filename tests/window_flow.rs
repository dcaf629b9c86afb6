mod common;

use actix_web::{http::StatusCode, test};
use common::{ALWAYS_OPEN, TestContext, get, post_json, registration, test_config};
use rollcall::config::AttendanceMode;
use rollcall::store::{AttendanceStore, CheckInFilter};
use serde_json::{Value, json};

#[actix_web::test]
async fn test_login_unknown_email() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/login/student", json!({ "email": "ghost@x.io" })).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email not found.");
}

#[actix_web::test]
async fn test_register_then_login_checks_in() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/register", registration("Ada Obi", "ada@x.io", "0801")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["session"], "new");
    assert_eq!(body["name"], "Ada Obi");
    assert!(body["time"].as_str().unwrap().len() == 5);

    let req = post_json("/api/login/student", json!({ "email": "ada@x.io" })).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["session"], "student");
    assert!(body.get("message").is_none());

    // the login rewrote the check-in made while registering, same window and day
    let rows = ctx.store.list_check_ins(&CheckInFilter::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].session, "student");
}

#[actix_web::test]
async fn test_register_known_email_without_other_fields() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/registerr", registration("Ada Obi", "ada@x.io", "0801")).to_request();
    test::call_service(&app, req).await;

    let req = post_json("/api/register", json!({ "name": "", "email": "Ada@x.io" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Ada Obi");
    assert_eq!(body["session"], "new");
    assert_eq!(ctx.store.list_users().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_login_without_email_gets_json_error() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/login/student", json!({})).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_outside_window_reports_notice() {
    let ctx = TestContext::new(test_config(AttendanceMode::Window, ""));
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/register", registration("Ada Obi", "ada@x.io", "0801")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered but not within the attendance window.");

    let req = post_json("/api/login/student", json!({ "email": "ada@x.io" })).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User found, but outside attendance window.");
    assert_eq!(body["name"], "Ada Obi");

    assert_eq!(ctx.store.list_users().await.unwrap().len(), 1);
    assert!(ctx.store.list_check_ins(&CheckInFilter::default()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_registerr_rejects_duplicate_email() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/registerr", registration("Ada Obi", "ada@x.io", "0801")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true }));

    let req = post_json("/api/registerr", registration("Someone", "ada@x.io", "0999")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");

    assert_eq!(ctx.store.list_users().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_registerr_allows_shared_phone() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    for email in ["ada@x.io", "bola@x.io"] {
        let req = post_json("/api/registerr", registration("Ada Obi", email, "0801")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_attendance_listing_and_filters() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    for (name, email) in [("Ada Obi", "ada@x.io"), ("Bola Ade", "bola@x.io")] {
        let req = post_json("/api/registerr", registration(name, email, "0801")).to_request();
        test::call_service(&app, req).await;
    }
    let req = post_json("/api/login/student", json!({ "email": "ada@x.io" })).to_request();
    let checked_in: Value = test::call_and_read_body_json(&app, req).await;
    let req = post_json("/api/login/mentor", json!({ "email": "bola@x.io" })).to_request();
    test::call_service(&app, req).await;

    let all: Value = test::call_and_read_body_json(&app, get("/api/attendees").to_request()).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let uri = format!(
        "/api/attendance?session=student&date={}",
        checked_in["date"].as_str().unwrap()
    );
    let filtered: Value = test::call_and_read_body_json(&app, get(&uri).to_request()).await;
    let rows = filtered.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "ada@x.io");
    assert_eq!(rows[0]["location"], "Lagos");
    assert_eq!(rows[0]["session"], "student");

    let none: Value = test::call_and_read_body_json(
        &app,
        get("/api/attendance?session=student&date=1999-01-01").to_request(),
    )
    .await;
    assert!(none.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_users_lists_everyone() {
    let ctx = TestContext::new(test_config(AttendanceMode::Window, ALWAYS_OPEN));
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/register", registration("Ada Obi", "ada@x.io", "0801")).to_request();
    test::call_service(&app, req).await;

    let users: Value = test::call_and_read_body_json(&app, get("/api/users").to_request()).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "ada@x.io");
    assert_eq!(users[0]["session"], "new");
}

#[actix_web::test]
async fn test_group_routes_absent_in_window_mode() {
    let ctx = TestContext::window_mode();
    let app = test::init_service(ctx.create_app()).await;

    let req = post_json("/api/mark-attendance", json!({ "email": "a@x.io", "session": "Class1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
