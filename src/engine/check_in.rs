use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::engine::AttendanceEngine;
use crate::engine::registration::{canonical_email, normalize};
use crate::error::AppError;
use crate::model::attendance::CheckIn;
use crate::model::user::{NewUser, User};
use crate::store::CheckInEntry;
use crate::utils::business_day::{BusinessDay, local_time_label};

/// Session label given to check-ins made while registering.
pub const REGISTRATION_SESSION: &str = "new";

#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    Recorded { user: User, check_in: CheckIn },
    OutsideWindow { user: User },
    UserNotFound,
}

impl AttendanceEngine {
    fn check_in_entry(&self, session: &str, now: DateTime<Utc>) -> CheckInEntry {
        let tz = self.settings.timezone;
        CheckInEntry {
            session: session.to_string(),
            time: local_time_label(now, tz),
            date: BusinessDay::containing(now, tz).date,
        }
    }

    /// Checks a known user in to `session` if a window is open at `now`.
    /// A repeat within the same window and day rewrites the earlier check-in.
    #[instrument(name = "login_check_in", skip(self, now))]
    pub async fn login_check_in(
        &self,
        email: &str,
        session: &str,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome, AppError> {
        let Some(user) = self.store.find_user_by_email(&canonical_email(email)).await? else {
            info!("Check-in refused: email not found");
            return Ok(CheckInOutcome::UserNotFound);
        };

        let Some(window) = self.settings.windows.evaluate(now, self.settings.timezone) else {
            debug!(user_id = user.id, "Outside every attendance window");
            return Ok(CheckInOutcome::OutsideWindow { user });
        };

        let entry = self.check_in_entry(session, now);
        let check_in = self.store.upsert_check_in(user.id, window, &entry).await?;

        info!(user_id = user.id, window = %window, time = %check_in.time, "Checked in");
        Ok(CheckInOutcome::Recorded { user, check_in })
    }

    /// Registers the user when the email is new, then records a check-in
    /// under the registration session if a window is open. Only the email is
    /// required from a user who is already registered.
    #[instrument(name = "register_check_in", skip_all, fields(email = %new_user.email))]
    pub async fn register_check_in(
        &self,
        new_user: NewUser,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome, AppError> {
        let email = canonical_email(&new_user.email);
        if email.is_empty() {
            return Err(AppError::Validation("Email must not be empty".into()));
        }

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                let new_user = normalize(NewUser {
                    session: Some(REGISTRATION_SESSION.to_string()),
                    ..new_user
                })?;
                let user = self.store.insert_user(&new_user).await?;
                info!(user_id = user.id, "Registered user");
                user
            }
        };

        if self.settings.windows.evaluate(now, self.settings.timezone).is_none() {
            debug!(user_id = user.id, "Registered outside every attendance window");
            return Ok(CheckInOutcome::OutsideWindow { user });
        }

        let entry = self.check_in_entry(REGISTRATION_SESSION, now);
        let check_in = self.store.insert_check_in(user.id, &entry).await?;
        Ok(CheckInOutcome::Recorded { user, check_in })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, engine, sample_user};
    use crate::store::{AttendanceStore, CheckInFilter};

    #[actix_web::test]
    async fn test_unknown_email() {
        let (engine, _) = engine();
        let outcome = engine
            .login_check_in("ghost@x.io", "student", at("2024-05-02T09:00:00Z"))
            .await
            .unwrap();
        assert_eq!(outcome, CheckInOutcome::UserNotFound);
    }

    #[actix_web::test]
    async fn test_outside_window_stores_nothing() {
        let (engine, store) = engine();
        store.insert_user(&sample_user("ada@x.io")).await.unwrap();

        // 17:30 UTC is 18:30 in Lagos, between windows
        let outcome = engine
            .login_check_in("ada@x.io", "student", at("2024-05-02T17:30:00Z"))
            .await
            .unwrap();

        assert!(matches!(outcome, CheckInOutcome::OutsideWindow { ref user } if user.email == "ada@x.io"));
        assert!(store.list_check_ins(&CheckInFilter::default()).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_repeat_in_same_window_updates() {
        let (engine, store) = engine();
        store.insert_user(&sample_user("ada@x.io")).await.unwrap();

        engine
            .login_check_in("ada@x.io", "student", at("2024-05-02T08:00:00Z"))
            .await
            .unwrap();
        let outcome = engine
            .login_check_in("ada@x.io", "mentor", at("2024-05-02T10:30:00Z"))
            .await
            .unwrap();

        let CheckInOutcome::Recorded { check_in, .. } = outcome else {
            panic!("expected a recorded check-in, got {outcome:?}");
        };
        assert_eq!(check_in.session, "mentor");
        assert_eq!(check_in.time, "11:30");
        assert_eq!(check_in.date.to_string(), "2024-05-02");

        let rows = store.list_check_ins(&CheckInFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[actix_web::test]
    async fn test_new_window_or_day_adds_a_row() {
        let (engine, store) = engine();
        store.insert_user(&sample_user("ada@x.io")).await.unwrap();

        for now in [
            "2024-05-02T08:00:00Z", // 09:00 first window
            "2024-05-02T15:00:00Z", // 16:00 second window
            "2024-05-03T08:00:00Z", // next day
        ] {
            engine.login_check_in("ada@x.io", "student", at(now)).await.unwrap();
        }

        let rows = store.list_check_ins(&CheckInFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[actix_web::test]
    async fn test_register_creates_user_once() {
        let (engine, store) = engine();

        let first = engine
            .register_check_in(sample_user(" ada@x.io "), at("2024-05-02T08:00:00Z"))
            .await
            .unwrap();
        let CheckInOutcome::Recorded { user, check_in } = first else {
            panic!("expected a recorded check-in, got {first:?}");
        };
        assert_eq!(user.email, "ada@x.io");
        assert_eq!(user.session.as_deref(), Some(REGISTRATION_SESSION));
        assert_eq!(check_in.session, REGISTRATION_SESSION);

        engine
            .register_check_in(sample_user("ada@x.io"), at("2024-05-02T08:05:00Z"))
            .await
            .unwrap();

        assert_eq!(store.list_users().await.unwrap().len(), 1);
        assert_eq!(store.list_check_ins(&CheckInFilter::default()).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_register_known_email_needs_no_other_fields() {
        let (engine, store) = engine();
        store.insert_user(&sample_user("ada@x.io")).await.unwrap();

        let bare = NewUser {
            name: String::new(),
            phone: String::new(),
            email: " ADA@x.io".into(),
            location: String::new(),
            session: None,
        };
        let outcome = engine
            .register_check_in(bare, at("2024-05-02T08:00:00Z"))
            .await
            .unwrap();

        let CheckInOutcome::Recorded { user, check_in } = outcome else {
            panic!("expected a recorded check-in, got {outcome:?}");
        };
        assert_eq!(user.name, "Ada Obi");
        assert_eq!(check_in.session, REGISTRATION_SESSION);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_register_new_email_still_needs_a_name() {
        let (engine, store) = engine();
        let mut nameless = sample_user("ada@x.io");
        nameless.name = "  ".into();

        let err = engine
            .register_check_in(nameless, at("2024-05-02T08:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_register_outside_window_still_registers() {
        let (engine, store) = engine();

        let outcome = engine
            .register_check_in(sample_user("ada@x.io"), at("2024-05-02T22:30:00Z"))
            .await
            .unwrap();

        assert!(matches!(outcome, CheckInOutcome::OutsideWindow { .. }));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
