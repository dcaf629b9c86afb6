use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::mysql::MySqlDatabaseError;
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, warn};

use crate::engine::window::AttendanceWindow;
use crate::error::{StoreError, StoreResult};
use crate::model::attendance::{Attendance, AttendeeRecord, CheckIn, SessionAttendee};
use crate::model::user::{NewUser, User};
use crate::store::{AttendanceStore, CheckInEntry, CheckInFilter, MarkPlan, MarkWrite};

const USER_COLUMNS: &str = "id, name, phone, email, location, session, created_at";

/// Attempts per transaction when InnoDB picks it as a deadlock victim.
const DEADLOCK_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn user_by(&self, column: &str, value: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ? LIMIT 1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn try_upsert_check_in(
        &self,
        user_id: u64,
        window: &AttendanceWindow,
        entry: &CheckInEntry,
    ) -> Result<CheckIn, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // HH:MM strings compare lexically in clock order
        let existing = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT id FROM check_ins
            WHERE user_id = ? AND date = ? AND time >= ? AND time <= ?
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(entry.date)
        .bind(window.start_label())
        .bind(window.end_label())
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(id) => {
                sqlx::query("UPDATE check_ins SET session = ?, time = ?, date = ? WHERE id = ?")
                    .bind(&entry.session)
                    .bind(&entry.time)
                    .bind(entry.date)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                debug!(check_in_id = id, user_id, "Updated check-in");
                id
            }
            None => {
                let done = sqlx::query(
                    "INSERT INTO check_ins (user_id, session, time, date) VALUES (?, ?, ?, ?)",
                )
                .bind(user_id)
                .bind(&entry.session)
                .bind(&entry.time)
                .bind(entry.date)
                .execute(&mut *tx)
                .await?;
                done.last_insert_id()
            }
        };

        tx.commit().await?;

        Ok(CheckIn {
            id,
            user_id,
            session: entry.session.clone(),
            time: entry.time.clone(),
            date: entry.date,
        })
    }

    // The unique key on (user_id, session, date) decides between concurrent
    // marks, so the insert runs before the superseded rows are touched.
    async fn try_record_mark(&self, plan: &MarkPlan) -> Result<MarkWrite, sqlx::Error> {
        let date = plan.day.date;
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO attendance (user_id, session, date, marked_at) VALUES (?, ?, ?, ?)",
        )
        .bind(plan.user_id)
        .bind(&plan.session)
        .bind(date)
        .bind(plan.marked_at)
        .execute(&mut *tx)
        .await;

        let id = match inserted {
            Ok(done) => done.last_insert_id(),
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await?;
                return Ok(MarkWrite::AlreadyMarked);
            }
            Err(e) => return Err(e),
        };

        let superseded = if plan.supersedes.is_empty() {
            0
        } else {
            let placeholders = vec!["?"; plan.supersedes.len()].join(", ");
            let sql = format!(
                "DELETE FROM attendance WHERE user_id = ? AND date = ? AND session IN ({placeholders})"
            );

            let mut delete = sqlx::query(&sql).bind(plan.user_id).bind(date);
            for session in &plan.supersedes {
                delete = delete.bind(session);
            }
            delete.execute(&mut *tx).await?.rows_affected()
        };

        tx.commit().await?;

        Ok(MarkWrite::Inserted {
            attendance: Attendance {
                id,
                user_id: plan.user_id,
                session: plan.session.clone(),
                date,
                marked_at: plan.marked_at,
            },
            superseded,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() || db_err.code().as_deref() == Some("23000")
        }
        _ => false,
    }
}

// ER_LOCK_DEADLOCK. Gap locks taken by concurrent writers to the same
// (user, date) range end this way, and a rerun sees the winner's row.
fn is_deadlock(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("40001")
                || db_err
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .is_some_and(|my| my.number() == 1213)
        }
        _ => false,
    }
}

async fn retry_on_deadlock<T, F, Fut>(operation: &'static str, mut run: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 1;
    loop {
        match run().await {
            Err(e) if is_deadlock(&e) && attempt < DEADLOCK_ATTEMPTS => {
                warn!(operation, attempt, "Deadlock, rerunning transaction");
                attempt += 1;
            }
            result => return result.map_err(StoreError::from),
        }
    }
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
    Date(NaiveDate),
}

#[derive(FromRow)]
struct SessionAttendeeRow {
    attendance_id: u64,
    session: String,
    date: NaiveDate,
    marked_at: DateTime<Utc>,
    id: u64,
    name: String,
    phone: String,
    email: String,
    location: String,
    user_session: Option<String>,
    created_at: DateTime<Utc>,
}

impl SessionAttendeeRow {
    fn to_domain(self) -> SessionAttendee {
        SessionAttendee {
            id: self.attendance_id,
            session: self.session,
            date: self.date,
            marked_at: self.marked_at,
            user: User {
                id: self.id,
                name: self.name,
                phone: self.phone,
                email: self.email,
                location: self.location,
                session: self.user_session,
                created_at: self.created_at,
            },
        }
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.user_by("email", email).await
    }

    async fn find_user_by_phone(&self, phone: &str) -> StoreResult<Option<User>> {
        self.user_by("phone", phone).await
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, phone, email, location, session)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(&user.location)
        .bind(&user.session)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(e) if is_unique_violation(&e) => return Err(StoreError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        };

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn list_users_attending(&self, date: NaiveDate) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.phone, u.email, u.location, u.session, u.created_at
            FROM users u
            WHERE EXISTS (
                SELECT 1 FROM attendance a
                WHERE a.user_id = u.id AND a.date = ?
            )
            ORDER BY u.id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn upsert_check_in(
        &self,
        user_id: u64,
        window: &AttendanceWindow,
        entry: &CheckInEntry,
    ) -> StoreResult<CheckIn> {
        retry_on_deadlock("upsert_check_in", move || {
            self.try_upsert_check_in(user_id, window, entry)
        })
        .await
    }

    async fn insert_check_in(&self, user_id: u64, entry: &CheckInEntry) -> StoreResult<CheckIn> {
        let done = sqlx::query(
            "INSERT INTO check_ins (user_id, session, time, date) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&entry.session)
        .bind(&entry.time)
        .bind(entry.date)
        .execute(&self.pool)
        .await?;

        Ok(CheckIn {
            id: done.last_insert_id(),
            user_id,
            session: entry.session.clone(),
            time: entry.time.clone(),
            date: entry.date,
        })
    }

    async fn list_check_ins(&self, filter: &CheckInFilter) -> StoreResult<Vec<AttendeeRecord>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(session) = filter.session.as_deref() {
            where_sql.push_str(" AND c.session = ?");
            args.push(FilterValue::Str(session));
        }

        if let Some(date) = filter.date {
            where_sql.push_str(" AND c.date = ?");
            args.push(FilterValue::Date(date));
        }

        let sql = format!(
            r#"
            SELECT u.name, u.email, u.phone, u.location, c.session, c.time, c.date
            FROM check_ins c
            JOIN users u ON u.id = c.user_id
            {}
            ORDER BY c.date, c.time, c.id
            "#,
            where_sql
        );

        let mut query = sqlx::query_as::<_, AttendeeRecord>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::Str(s) => query.bind(s),
                FilterValue::Date(d) => query.bind(d),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn record_mark(&self, plan: &MarkPlan) -> StoreResult<MarkWrite> {
        retry_on_deadlock("record_mark", move || self.try_record_mark(plan)).await
    }

    async fn list_session_attendance(
        &self,
        session: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<SessionAttendee>> {
        let rows = sqlx::query_as::<_, SessionAttendeeRow>(
            r#"
            SELECT
                a.id AS attendance_id,
                a.session,
                a.date,
                a.marked_at,
                u.id,
                u.name,
                u.phone,
                u.email,
                u.location,
                u.session AS user_session,
                u.created_at
            FROM attendance a
            JOIN users u ON u.id = a.user_id
            WHERE a.session = ? AND a.date = ?
            ORDER BY a.marked_at
            "#,
        )
        .bind(session)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SessionAttendeeRow::to_domain).collect())
    }

    async fn list_user_attendance(&self, user_id: u64) -> StoreResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, user_id, session, date, marked_at
            FROM attendance
            WHERE user_id = ?
            ORDER BY date, marked_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
