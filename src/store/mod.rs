//! Persistence for users, window check-ins and session attendance.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::engine::window::AttendanceWindow;
use crate::error::StoreResult;
use crate::model::attendance::{Attendance, AttendeeRecord, CheckIn, SessionAttendee};
use crate::model::user::{NewUser, User};
use crate::utils::business_day::BusinessDay;

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Values written by a window-mode check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInEntry {
    pub session: String,
    pub time: String,
    pub date: NaiveDate,
}

/// Optional filters for listing check-ins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInFilter {
    pub session: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Everything the store needs to apply one group-mode mark atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkPlan {
    pub user_id: u64,
    pub session: String,
    pub day: BusinessDay,
    pub marked_at: DateTime<Utc>,
    /// Same-group sessions whose records for `day` are replaced
    pub supersedes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkWrite {
    Inserted {
        attendance: Attendance,
        superseded: u64,
    },
    AlreadyMarked,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    // Users

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_phone(&self, phone: &str) -> StoreResult<Option<User>>;

    /// Fails with `StoreError::DuplicateEmail` when the email is taken.
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Users holding at least one session attendance on `date`.
    async fn list_users_attending(&self, date: NaiveDate) -> StoreResult<Vec<User>>;

    // Window check-ins

    /// Updates the user's check-in for `entry.date` whose time falls within
    /// the window's `HH:MM` bounds, or inserts one when there is none.
    async fn upsert_check_in(
        &self,
        user_id: u64,
        window: &AttendanceWindow,
        entry: &CheckInEntry,
    ) -> StoreResult<CheckIn>;

    async fn insert_check_in(&self, user_id: u64, entry: &CheckInEntry) -> StoreResult<CheckIn>;

    async fn list_check_ins(&self, filter: &CheckInFilter) -> StoreResult<Vec<AttendeeRecord>>;

    // Session attendance

    /// Rejects when (user, session, day) already exists, otherwise deletes the
    /// superseded same-day rows and inserts, all in one unit.
    async fn record_mark(&self, plan: &MarkPlan) -> StoreResult<MarkWrite>;

    async fn list_session_attendance(
        &self,
        session: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<SessionAttendee>>;

    async fn list_user_attendance(&self, user_id: u64) -> StoreResult<Vec<Attendance>>;
}
