use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User, UserChanges};

const USER_COLUMNS: &str = "id, first_name, last_name, phone_number, address, role, email, \
                            password_hash, created_at, updated_at";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            _ => StoreError::Other(e.into()),
        }
    }
}

/// Persistent collection of users.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Insert a user; the email uniqueness constraint is enforced here.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    /// Apply a partial update, returning the updated row or `None` if the id is unknown.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, phone_number, address, role, email, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(&user.address)
        .bind(&user.role)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name    = COALESCE($2, first_name),
                last_name     = COALESCE($3, last_name),
                phone_number  = COALESCE($4, phone_number),
                address       = COALESCE($5, address),
                role          = COALESCE($6, role),
                email         = COALESCE($7, email),
                password_hash = COALESCE($8, password_hash),
                updated_at    = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.phone_number)
        .bind(changes.address)
        .bind(changes.role)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.db)
        .await?;
        Ok(updated)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
