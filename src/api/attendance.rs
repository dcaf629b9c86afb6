use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::engine::AttendanceEngine;
use crate::engine::mark::MarkOutcome;
use crate::error::AppError;
use crate::models::{MarkAttendanceReq, MarkResponse};
use crate::utils::business_day::BusinessDay;

/// Mark attendance for a session
#[utoipa::path(
    post,
    path = "/api/mark-attendance",
    request_body = MarkAttendanceReq,
    responses(
        (status = 200, description = "Attendance marked, possibly replacing a same-group mark", body = MarkResponse),
        (status = 400, description = "Unknown user or already marked today", body = Object, example = json!({
            "success": false,
            "code": "ALREADY_MARKED",
            "message": "Attendance already marked for this session today."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    engine: web::Data<AttendanceEngine>,
    payload: web::Json<MarkAttendanceReq>,
) -> Result<HttpResponse, AppError> {
    let outcome = engine
        .mark_attendance(&payload.email, &payload.session, Utc::now())
        .await?;

    match outcome {
        MarkOutcome::Marked {
            attendance,
            superseded,
        } => Ok(HttpResponse::Ok().json(MarkResponse {
            success: true,
            attendance,
            superseded,
        })),
        MarkOutcome::Rejected(code) => Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "code": code,
            "message": code.message()
        }))),
    }
}

/// Today's attendance for one session
#[utoipa::path(
    get,
    path = "/api/session/{session}",
    params(
        ("session" = String, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Attendance with user details", body = [SessionAttendee]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn session_attendance(
    engine: web::Data<AttendanceEngine>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = path.into_inner();
    let today = BusinessDay::containing(Utc::now(), engine.settings().timezone);

    let rows = engine
        .store()
        .list_session_attendance(&session, today.date)
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

