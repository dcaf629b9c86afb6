use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::user::User;

/// Session attendance recorded in group mode. One row per user, session and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "Class1")]
    pub session: String,
    /// Business day in the configured timezone
    #[schema(example = "2024-05-02", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2024-05-02T09:15:00Z", format = "date-time", value_type = String)]
    pub marked_at: DateTime<Utc>,
}

/// Window-mode check-in. `time` is the local `HH:MM` the user checked in at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CheckIn {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "student")]
    pub session: String,
    #[schema(example = "09:15")]
    pub time: String,
    #[schema(example = "2024-05-02", format = "date", value_type = String)]
    pub date: NaiveDate,
}

/// Check-in joined with the contact details of the user who made it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendeeRecord {
    #[schema(example = "Ada Obi")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "+2348012345678")]
    pub phone: String,
    #[schema(example = "Lagos")]
    pub location: String,
    #[schema(example = "student")]
    pub session: String,
    #[schema(example = "09:15")]
    pub time: String,
    #[schema(example = "2024-05-02", format = "date", value_type = String)]
    pub date: NaiveDate,
}

/// Attendance with its user populated.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionAttendee {
    pub id: u64,
    pub session: String,
    #[schema(format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(format = "date-time", value_type = String)]
    pub marked_at: DateTime<Utc>,
    pub user: User,
}
