use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::engine::AttendanceEngine;
use crate::engine::registration::canonical_email;
use crate::error::AppError;
use crate::model::attendance::Attendance;
use crate::store::{MarkPlan, MarkWrite};
use crate::utils::business_day::BusinessDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkRejection {
    UserNotFound,
    AlreadyMarked,
}

impl MarkRejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::UserNotFound => "User not found. Please register first.",
            Self::AlreadyMarked => "Attendance already marked for this session today.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkOutcome {
    Marked {
        attendance: Attendance,
        /// same-group records replaced by this mark
        superseded: u64,
    },
    Rejected(MarkRejection),
}

impl AttendanceEngine {
    /// Records that the user attended `session` today. Marking another
    /// session of the same group replaces today's earlier mark.
    #[instrument(name = "mark_attendance", skip(self, now))]
    pub async fn mark_attendance(
        &self,
        email: &str,
        session: &str,
        now: DateTime<Utc>,
    ) -> Result<MarkOutcome, AppError> {
        let session = session.trim();
        if session.is_empty() {
            return Err(AppError::Validation("Session must not be empty".into()));
        }

        let Some(user) = self.store.find_user_by_email(&canonical_email(email)).await? else {
            info!("Mark refused: email not found");
            return Ok(MarkOutcome::Rejected(MarkRejection::UserNotFound));
        };

        let day = BusinessDay::containing(now, self.settings.timezone);
        let supersedes = self
            .settings
            .groups
            .group_of(session)
            .map(|group| group.others(session))
            .unwrap_or_default();

        debug!(
            user_id = user.id,
            date = %day.date,
            start = %day.start,
            end = %day.end,
            supersedes = ?supersedes,
            "Applying mark"
        );

        let plan = MarkPlan {
            user_id: user.id,
            session: session.to_string(),
            day,
            marked_at: now,
            supersedes,
        };

        match self.store.record_mark(&plan).await? {
            MarkWrite::AlreadyMarked => {
                info!(user_id = user.id, "Mark refused: already marked today");
                Ok(MarkOutcome::Rejected(MarkRejection::AlreadyMarked))
            }
            MarkWrite::Inserted {
                attendance,
                superseded,
            } => {
                info!(
                    user_id = user.id,
                    attendance_id = attendance.id,
                    superseded,
                    "Attendance marked"
                );
                Ok(MarkOutcome::Marked {
                    attendance,
                    superseded,
                })
            }
        }
    }
}
