use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a registered user
///
/// This struct maps directly to the `users` table in the database.
/// The password hash is never serialized into API responses.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Unique identifier for the user (UUID v4 as string)
    uuid: String,

    /// Login email, unique across users
    email: String,

    /// bcrypt hash of the user's password
    #[serde(skip)]
    password_hash: String,

    /// Optional name shown next to the user's ratings
    #[serde(rename = "displayName")]
    display_name: Option<String>,

    #[serde(rename = "createdAt")]
    created_at: NaiveDateTime,

    #[serde(rename = "updatedAt")]
    updated_at: NaiveDateTime,
}

impl User {
    /// Creates a new user with a freshly generated UUID
    ///
    /// ### Arguments
    ///
    /// * `email` - The login email
    /// * `password_hash` - An already hashed password
    /// * `display_name` - Optional display name
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            uuid: Uuid::new_v4().to_string(),
            email,
            password_hash,
            display_name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_uuid(&self) -> String {
        self.uuid.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_display_name(&self) -> Option<String> {
        self.display_name.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Returns the public projection of this user
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            uuid: self.uuid.clone(),
            email: self.email.clone(),
        }
    }
}

/// The public part of a user attached to ratings and token payloads
#[derive(Queryable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub uuid: String,
    pub email: String,
}

/// Partial update of a user's profile
///
/// `None` fields are left untouched.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}
