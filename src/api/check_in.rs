use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::engine::{AttendanceEngine, CheckInOutcome};
use crate::error::AppError;
use crate::models::{AttendanceQuery, CheckInResponse, LoginReq, RegisterReq};
use crate::store::{AttendanceStore, CheckInFilter};

fn check_in_response(outcome: CheckInOutcome, outside_message: &str) -> CheckInResponse {
    match outcome {
        CheckInOutcome::Recorded { user, check_in } => CheckInResponse {
            success: true,
            session: Some(check_in.session),
            time: Some(check_in.time),
            date: Some(check_in.date),
            name: Some(user.name),
            message: None,
        },
        CheckInOutcome::OutsideWindow { user } => CheckInResponse {
            success: true,
            session: None,
            time: None,
            date: None,
            name: Some(user.name),
            message: Some(outside_message.to_string()),
        },
        CheckInOutcome::UserNotFound => CheckInResponse {
            success: false,
            session: None,
            time: None,
            date: None,
            name: None,
            message: Some("Email not found.".to_string()),
        },
    }
}

/// Check in under the session label in the path
#[utoipa::path(
    post,
    path = "/api/login/{role}",
    params(
        ("role" = String, Path, description = "Session label recorded with the check-in")
    ),
    request_body = LoginReq,
    responses(
        (status = 200, description = "Checked in, outside every window, or unknown email", body = CheckInResponse, example = json!({
            "success": true,
            "session": "student",
            "time": "09:15",
            "date": "2024-05-02",
            "name": "Ada Obi"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Check-in"
)]
pub async fn login(
    engine: web::Data<AttendanceEngine>,
    path: web::Path<String>,
    payload: web::Json<LoginReq>,
) -> Result<HttpResponse, AppError> {
    let role = path.into_inner();
    let outcome = engine
        .login_check_in(&payload.email, &role, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(check_in_response(
        outcome,
        "User found, but outside attendance window.",
    )))
}

/// Register if new, then check in under the `new` session
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterReq,
    responses(
        (status = 200, description = "Registered and possibly checked in", body = CheckInResponse, example = json!({
            "success": true,
            "session": "new",
            "time": "09:15",
            "date": "2024-05-02",
            "name": "Ada Obi"
        })),
        (status = 400, description = "Missing name or email"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Check-in"
)]
pub async fn register(
    engine: web::Data<AttendanceEngine>,
    payload: web::Json<RegisterReq>,
) -> Result<HttpResponse, AppError> {
    let outcome = engine
        .register_check_in(payload.into_inner().into(), Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(check_in_response(
        outcome,
        "User registered but not within the attendance window.",
    )))
}

/// Check-ins with user details, optionally filtered by session and date
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Matching check-ins", body = [AttendeeRecord]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Check-in"
)]
pub async fn attendance_list(
    store: web::Data<dyn AttendanceStore>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = CheckInFilter {
        session: query.session.filter(|s| !s.is_empty()),
        date: query.date,
    };

    let rows = store.list_check_ins(&filter).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Every check-in with user details
#[utoipa::path(
    get,
    path = "/api/attendees",
    responses(
        (status = 200, description = "All check-ins", body = [AttendeeRecord]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Check-in"
)]
pub async fn attendees(store: web::Data<dyn AttendanceStore>) -> Result<HttpResponse, AppError> {
    let rows = store.list_check_ins(&CheckInFilter::default()).await?;
    Ok(HttpResponse::Ok().json(rows))
}
