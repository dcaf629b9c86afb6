use tracing::{info, instrument};

use crate::engine::AttendanceEngine;
use crate::error::AppError;
use crate::model::user::{NewUser, User};

/// Emails match case-insensitively, so they are stored and looked up in this form.
pub(crate) fn canonical_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trims every field and requires a name and an email.
pub(crate) fn normalize(user: NewUser) -> Result<NewUser, AppError> {
    let user = NewUser {
        name: user.name.trim().to_string(),
        phone: user.phone.trim().to_string(),
        email: canonical_email(&user.email),
        location: user.location.trim().to_string(),
        session: user.session,
    };

    if user.email.is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if user.name.is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }
    Ok(user)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonePolicy {
    Unique,
    Shared,
}

impl AttendanceEngine {
    /// Creates a user, refusing a taken email and, under `PhonePolicy::Unique`,
    /// a taken phone number.
    #[instrument(name = "register_user", skip_all, fields(email = %new_user.email))]
    pub async fn register_user(
        &self,
        new_user: NewUser,
        phones: PhonePolicy,
    ) -> Result<User, AppError> {
        let new_user = normalize(new_user)?;

        if self.store.find_user_by_email(&new_user.email).await?.is_some() {
            info!("Registration refused: email taken");
            return Err(AppError::DuplicateEmail);
        }

        if phones == PhonePolicy::Unique
            && !new_user.phone.is_empty()
            && self.store.find_user_by_phone(&new_user.phone).await?.is_some()
        {
            info!("Registration refused: phone taken");
            return Err(AppError::DuplicatePhone);
        }

        // a concurrent insert of the same email surfaces as DuplicateEmail here
        let user = self.store.insert_user(&new_user).await?;
        info!(user_id = user.id, "Registered user");
        Ok(user)
    }
}
