use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::model::attendance::Attendance;
use crate::model::user::NewUser;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Ada Obi")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "+2348012345678")]
    pub phone: String,
    #[schema(example = "ada@example.com", format = "email")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "Lagos")]
    pub location: String,
}

impl From<RegisterReq> for NewUser {
    fn from(req: RegisterReq) -> Self {
        NewUser {
            name: req.name,
            phone: req.phone,
            email: req.email,
            location: req.location,
            session: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "ada@example.com", format = "email")]
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendanceReq {
    #[schema(example = "ada@example.com", format = "email")]
    pub email: String,
    #[schema(example = "Class1")]
    pub session: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    /// Only check-ins under this session label
    #[param(example = "student")]
    pub session: Option<String>,
    /// Only check-ins on this business day
    #[param(value_type = Option<String>, example = "2024-05-02")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserListType {
    #[default]
    Registered,
    Attendees,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// `registered` for everyone, `attendees` for users marked today
    #[serde(rename = "type", default)]
    #[param(value_type = Option<String>, example = "attendees")]
    pub list_type: UserListType,
}

/// Window-mode check-in reply. `session`, `time` and `date` are present only
/// when a check-in was recorded; `message` only when it was not.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkResponse {
    pub success: bool,
    pub attendance: Attendance,
    /// same-group records from today that this mark replaced
    pub superseded: u64,
}
