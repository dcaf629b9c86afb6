use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::engine::AttendanceEngine;
use crate::engine::registration::{PhonePolicy, canonical_email};
use crate::error::AppError;
use crate::models::{RegisterReq, UserListQuery, UserListType};
use crate::store::AttendanceStore;
use crate::utils::business_day::BusinessDay;

/// Register a user without checking in
#[utoipa::path(
    post,
    path = "/api/registerr",
    request_body = RegisterReq,
    responses(
        (status = 200, description = "User registered", body = Object, example = json!({
            "success": true
        })),
        (status = 400, description = "Email already registered", body = Object, example = json!({
            "success": false,
            "code": "DUPLICATE_EMAIL",
            "message": "Email already registered."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn register_only(
    engine: web::Data<AttendanceEngine>,
    payload: web::Json<RegisterReq>,
) -> Result<HttpResponse, AppError> {
    engine
        .register_user(payload.into_inner().into(), PhonePolicy::Shared)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Register a user with a unique email and phone
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Email or phone already registered", body = Object, example = json!({
            "success": false,
            "code": "DUPLICATE_PHONE",
            "message": "Phone number already registered."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn register_user(
    engine: web::Data<AttendanceEngine>,
    payload: web::Json<RegisterReq>,
) -> Result<HttpResponse, AppError> {
    let user = engine
        .register_user(payload.into_inner().into(), PhonePolicy::Unique)
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Look a user up by email
#[utoipa::path(
    get,
    path = "/api/user/{email}",
    params(
        ("email" = String, Path, description = "Registered email address")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = Object, example = json!({
            "success": false,
            "code": "NOT_FOUND",
            "message": "User not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn get_user(
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();

    match store.find_user_by_email(&canonical_email(&email)).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Every registered user
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn list_users(store: web::Data<dyn AttendanceStore>) -> Result<HttpResponse, AppError> {
    let users = store.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Registered users, or only those marked today
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users of the requested type", body = [User]),
        (status = 400, description = "Unknown type"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn list_users_by_type(
    engine: web::Data<AttendanceEngine>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, AppError> {
    let store = engine.store();

    let users = match query.list_type {
        UserListType::Registered => store.list_users().await?,
        UserListType::Attendees => {
            let today = BusinessDay::containing(Utc::now(), engine.settings().timezone);
            store.list_users_attending(today.date).await?
        }
    };

    Ok(HttpResponse::Ok().json(users))
}
