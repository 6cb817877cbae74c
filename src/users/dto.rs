use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::User;

/// Request body for `POST /update`. Absent or blank fields keep their value.
///
/// `id` is kept as raw JSON so that a number or other non-uuid value reaches
/// the handler and is answered as an unknown user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub id: Option<serde_json::Value>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User projection without the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub role: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            phone_number: u.phone_number,
            address: u.address,
            role: u.role,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateUserResponse {
    pub message: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_never_carries_a_password() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            first_name: "A".into(),
            last_name: "B".into(),
            phone_number: "1".into(),
            address: "X".into(),
            role: "user".into(),
            email: "a@b.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert_eq!(json["firstName"], "A");
        assert_eq!(json["email"], "a@b.com");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }
}
