use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Role value that unlocks the admin screens. Any other role is ordinary.
pub const ADMIN_ROLE: &str = "admin";

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub role: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields needed to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub role: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn apply_to(self, user: &mut User) {
        if let Some(v) = self.first_name {
            user.first_name = v;
        }
        if let Some(v) = self.last_name {
            user.last_name = v;
        }
        if let Some(v) = self.phone_number {
            user.phone_number = v;
        }
        if let Some(v) = self.address {
            user.address = v;
        }
        if let Some(v) = self.role {
            user.role = v;
        }
        if let Some(v) = self.email {
            user.email = v;
        }
        if let Some(v) = self.password_hash {
            user.password_hash = v;
        }
    }
}
