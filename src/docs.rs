use crate::config::AttendanceMode;
use crate::model::attendance::{Attendance, AttendeeRecord, CheckIn, SessionAttendee};
use crate::model::user::User;
use crate::models::{CheckInResponse, LoginReq, MarkAttendanceReq, MarkResponse, RegisterReq};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rollcall API (window mode)",
        version = "0.1.0",
        description = r#"
## Attendance check-in

Users register with their contact details and check in under a session label.
A check-in is recorded only while one of the configured daily **attendance
windows** is open in the deployment's timezone. Checking in again inside the
same window on the same day rewrites the earlier check-in.

Administrators list check-ins by session and date.
"#,
    ),
    paths(
        crate::api::check_in::login,
        crate::api::check_in::register,
        crate::api::check_in::attendance_list,
        crate::api::check_in::attendees,
        crate::api::user::register_only,
        crate::api::user::list_users,
    ),
    components(
        schemas(
            LoginReq,
            RegisterReq,
            CheckInResponse,
            CheckIn,
            AttendeeRecord,
            User
        )
    ),
    tags(
        (name = "Check-in", description = "Window-gated check-in APIs"),
        (name = "Users", description = "User registration and listing APIs"),
    )
)]
pub struct WindowApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rollcall API (group mode)",
        version = "0.1.0",
        description = r#"
## Session attendance

Users register once, with a unique email and phone, then mark attendance for a
session. A session can be marked once per day. Sessions in the same **session
group** are mutually exclusive: marking one replaces that day's mark for any
other session of the group.
"#,
    ),
    paths(
        crate::api::user::register_user,
        crate::api::user::get_user,
        crate::api::user::list_users_by_type,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::session_attendance,
    ),
    components(
        schemas(
            RegisterReq,
            MarkAttendanceReq,
            MarkResponse,
            Attendance,
            SessionAttendee,
            User
        )
    ),
    tags(
        (name = "Attendance", description = "Session attendance APIs"),
        (name = "Users", description = "User registration and lookup APIs"),
    )
)]
pub struct GroupApiDoc;

pub fn openapi_for(mode: AttendanceMode) -> openapi::OpenApi {
    match mode {
        AttendanceMode::Window => WindowApiDoc::openapi(),
        AttendanceMode::Group => GroupApiDoc::openapi(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_mode_documents_its_own_routes() {
        let window = openapi_for(AttendanceMode::Window);
        assert!(window.paths.paths.contains_key("/api/login/{role}"));
        assert!(!window.paths.paths.contains_key("/api/mark-attendance"));

        let group = openapi_for(AttendanceMode::Group);
        assert!(group.paths.paths.contains_key("/api/mark-attendance"));
        assert!(group.paths.paths.contains_key("/api/session/{session}"));
    }
}
