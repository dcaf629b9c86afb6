//! In-process store for tests and database-free development runs.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::engine::window::AttendanceWindow;
use crate::error::{StoreError, StoreResult};
use crate::model::attendance::{Attendance, AttendeeRecord, CheckIn, SessionAttendee};
use crate::model::user::{NewUser, User};
use crate::store::{AttendanceStore, CheckInEntry, CheckInFilter, MarkPlan, MarkWrite};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    check_ins: Vec<CheckIn>,
    attendance: Vec<Attendance>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_phone(&self, phone: &str) -> StoreResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.phone == phone).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let created = User {
            id: tables.next_id(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            location: user.location.clone(),
            session: user.session.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.lock()?.users.clone())
    }

    async fn list_users_attending(&self, date: NaiveDate) -> StoreResult<Vec<User>> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .filter(|u| {
                tables
                    .attendance
                    .iter()
                    .any(|a| a.user_id == u.id && a.date == date)
            })
            .cloned()
            .collect())
    }

    async fn upsert_check_in(
        &self,
        user_id: u64,
        window: &AttendanceWindow,
        entry: &CheckInEntry,
    ) -> StoreResult<CheckIn> {
        let (start, end) = (window.start_label(), window.end_label());
        let mut tables = self.lock()?;

        let existing = tables.check_ins.iter_mut().find(|c| {
            c.user_id == user_id
                && c.date == entry.date
                && c.time.as_str() >= start.as_str()
                && c.time.as_str() <= end.as_str()
        });

        if let Some(check_in) = existing {
            check_in.session = entry.session.clone();
            check_in.time = entry.time.clone();
            check_in.date = entry.date;
            return Ok(check_in.clone());
        }

        let check_in = CheckIn {
            id: tables.next_id(),
            user_id,
            session: entry.session.clone(),
            time: entry.time.clone(),
            date: entry.date,
        };
        tables.check_ins.push(check_in.clone());
        Ok(check_in)
    }

    async fn insert_check_in(&self, user_id: u64, entry: &CheckInEntry) -> StoreResult<CheckIn> {
        let mut tables = self.lock()?;
        let check_in = CheckIn {
            id: tables.next_id(),
            user_id,
            session: entry.session.clone(),
            time: entry.time.clone(),
            date: entry.date,
        };
        tables.check_ins.push(check_in.clone());
        Ok(check_in)
    }

    async fn list_check_ins(&self, filter: &CheckInFilter) -> StoreResult<Vec<AttendeeRecord>> {
        let tables = self.lock()?;
        Ok(tables
            .check_ins
            .iter()
            .filter(|c| filter.session.as_ref().is_none_or(|s| &c.session == s))
            .filter(|c| filter.date.is_none_or(|d| c.date == d))
            .filter_map(|c| {
                tables.user(c.user_id).map(|u| AttendeeRecord {
                    name: u.name.clone(),
                    email: u.email.clone(),
                    phone: u.phone.clone(),
                    location: u.location.clone(),
                    session: c.session.clone(),
                    time: c.time.clone(),
                    date: c.date,
                })
            })
            .collect())
    }

    async fn record_mark(&self, plan: &MarkPlan) -> StoreResult<MarkWrite> {
        let mut tables = self.lock()?;
        let date = plan.day.date;

        if tables
            .attendance
            .iter()
            .any(|a| a.user_id == plan.user_id && a.session == plan.session && a.date == date)
        {
            return Ok(MarkWrite::AlreadyMarked);
        }

        let before = tables.attendance.len();
        tables.attendance.retain(|a| {
            !(a.user_id == plan.user_id && a.date == date && plan.supersedes.contains(&a.session))
        });
        let superseded = (before - tables.attendance.len()) as u64;

        let attendance = Attendance {
            id: tables.next_id(),
            user_id: plan.user_id,
            session: plan.session.clone(),
            date,
            marked_at: plan.marked_at,
        };
        tables.attendance.push(attendance.clone());

        Ok(MarkWrite::Inserted {
            attendance,
            superseded,
        })
    }

    async fn list_session_attendance(
        &self,
        session: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<SessionAttendee>> {
        let tables = self.lock()?;
        Ok(tables
            .attendance
            .iter()
            .filter(|a| a.session == session && a.date == date)
            .filter_map(|a| {
                tables.user(a.user_id).map(|u| SessionAttendee {
                    id: a.id,
                    session: a.session.clone(),
                    date: a.date,
                    marked_at: a.marked_at,
                    user: u.clone(),
                })
            })
            .collect())
    }

    async fn list_user_attendance(&self, user_id: u64) -> StoreResult<Vec<Attendance>> {
        let tables = self.lock()?;
        Ok(tables
            .attendance
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::window::WindowSchedule;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            phone: "0801".into(),
            email: email.into(),
            location: "Lagos".into(),
            session: None,
        }
    }

    fn entry(time: &str, day: u32) -> CheckInEntry {
        CheckInEntry {
            session: "student".into(),
            time: time.into(),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        }
    }

    #[actix_web::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&new_user("a@x.io")).await.unwrap();

        let err = store.insert_user(&new_user("a@x.io")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_upsert_matches_window_and_day() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("a@x.io")).await.unwrap();
        let schedule = WindowSchedule::parse("08:00-12:00,13:00-17:00").unwrap();
        let morning = schedule.windows()[0];
        let afternoon = schedule.windows()[1];

        let first = store.upsert_check_in(user.id, &morning, &entry("08:30", 2)).await.unwrap();
        let again = store.upsert_check_in(user.id, &morning, &entry("11:45", 2)).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.time, "11:45");

        store.upsert_check_in(user.id, &afternoon, &entry("13:10", 2)).await.unwrap();
        store.upsert_check_in(user.id, &morning, &entry("09:00", 3)).await.unwrap();

        let all = store.list_check_ins(&CheckInFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[actix_web::test]
    async fn test_check_in_filters() {
        let store = MemoryStore::new();
        let user = store.insert_user(&new_user("a@x.io")).await.unwrap();
        store.insert_check_in(user.id, &entry("08:30", 2)).await.unwrap();
        let mut other = entry("09:30", 3);
        other.session = "mentor".into();
        store.insert_check_in(user.id, &other).await.unwrap();

        let by_session = CheckInFilter {
            session: Some("mentor".into()),
            date: None,
        };
        let rows = store.list_check_ins(&by_session).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "a@x.io");
        assert_eq!(rows[0].time, "09:30");

        let by_date = CheckInFilter {
            session: None,
            date: NaiveDate::from_ymd_opt(2024, 5, 2),
        };
        assert_eq!(store.list_check_ins(&by_date).await.unwrap().len(), 1);
    }
}
