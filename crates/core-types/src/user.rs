use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

const MISSING_USER_FIELDS: &str = "Email, felhasználónév és jelszó megadása kötelező!";

/// The stored form of a user's password: a one-way hash plus an
/// independently generated salt. Neither field is ever serialized.
#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct Credential {
    pub password_hash: String,
    pub salt: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").finish_non_exhaustive()
    }
}

/// A row of the `users` table, credential included.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub email: String,
    pub display_name: String,
    #[sqlx(flatten)]
    pub credential: Credential,
    pub avatar_url: Option<String>,
    pub permission_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The outbound representation of a user. It has no credential fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub permission_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/users`.
///
/// Required fields are optional here so that a missing field is reported
/// with the same message as a blank one.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(alias = "plaintextSecret")]
    pub password: Option<String>,
    pub avatar_url: Option<String>,
    pub permission_level: Option<i32>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("avatar_url", &self.avatar_url)
            .field("permission_level", &self.permission_level)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Checks that email, display name and password are all present and non-blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if present(&self.email) && present(&self.display_name) && present(&self.password) {
            Ok(())
        } else {
            Err(CoreError::MissingFields(MISSING_USER_FIELDS.to_string()))
        }
    }

    /// Validates the body and unwraps its required fields.
    pub fn into_validated(self) -> Result<ValidatedNewUser, CoreError> {
        self.validate()?;
        match (self.email, self.display_name, self.password) {
            (Some(email), Some(display_name), Some(password)) => Ok(ValidatedNewUser {
                email: email.trim().to_string(),
                display_name: display_name.trim().to_string(),
                password,
                avatar_url: self.avatar_url,
                permission_level: self.permission_level.unwrap_or(0),
            }),
            _ => Err(CoreError::MissingFields(MISSING_USER_FIELDS.to_string())),
        }
    }
}

/// A `NewUser` whose required fields are known to be present.
#[derive(Clone)]
pub struct ValidatedNewUser {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub permission_level: i32,
}

impl fmt::Debug for ValidatedNewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedNewUser")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("avatar_url", &self.avatar_url)
            .field("permission_level", &self.permission_level)
            .finish_non_exhaustive()
    }
}

/// Body of `PUT /api/users/:id`. Every field is optional.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(alias = "plaintextSecret")]
    pub password: Option<String>,
    pub avatar_url: Option<String>,
    pub permission_level: Option<i32>,
}

impl fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserUpdate")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("avatar_url", &self.avatar_url)
            .field("permission_level", &self.permission_level)
            .finish()
    }
}

impl UserUpdate {
    /// A supplied field must not be blank; an absent one is left untouched.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("email", &self.email),
            ("displayName", &self.display_name),
            ("password", &self.password),
        ] {
            if value.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(CoreError::InvalidInput(
                    name.to_string(),
                    "must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Everything the store needs to insert a user.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: String,
    pub display_name: String,
    pub credential: Credential,
    pub avatar_url: Option<String>,
    pub permission_level: i32,
}

/// A partial update as applied by the store. `credential` is `Some` only
/// when the caller supplied a new password; otherwise the stored credential
/// columns are left alone.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub credential: Option<Credential>,
    pub avatar_url: Option<String>,
    pub permission_level: Option<i32>,
}

impl UserChanges {
    /// Email and display name are trimmed the same way as on create.
    pub fn new(update: UserUpdate, credential: Option<Credential>) -> Self {
        Self {
            email: update.email.map(|e| e.trim().to_string()),
            display_name: update.display_name.map(|n| n.trim().to_string()),
            credential,
            avatar_url: update.avatar_url,
            permission_level: update.permission_level,
        }
    }

    /// Applies the changes to a record in place and bumps `updated_at`.
    pub fn apply_to(self, record: &mut UserRecord, now: DateTime<Utc>) {
        if let Some(email) = self.email {
            record.email = email;
        }
        if let Some(display_name) = self.display_name {
            record.display_name = display_name;
        }
        if let Some(credential) = self.credential {
            record.credential = credential;
        }
        if let Some(avatar_url) = self.avatar_url {
            record.avatar_url = Some(avatar_url);
        }
        if let Some(level) = self.permission_level {
            record.permission_level = level;
        }
        record.updated_at = now;
    }
}
