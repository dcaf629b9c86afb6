use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Ada Obi",
        "phone": "+2348012345678",
        "email": "ada@example.com",
        "location": "Lagos",
        "session": null,
        "created_at": "2024-05-02T09:15:00Z"
    })
)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ada Obi")]
    pub name: String,

    #[schema(example = "+2348012345678")]
    pub phone: String,

    #[schema(example = "ada@example.com", format = "email")]
    pub email: String,

    #[schema(example = "Lagos")]
    pub location: String,

    /// Legacy marker, `"new"` for users created by the check-in registration flow
    #[schema(nullable = true)]
    pub session: Option<String>,

    #[schema(example = "2024-05-02T09:15:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// User fields as supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub location: String,
    pub session: Option<String>,
}
