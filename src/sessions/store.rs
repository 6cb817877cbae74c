use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::repo_types::{User, ADMIN_ROLE};

/// Snapshot of the logged-in user taken at login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl SessionData {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl From<&User> for SessionData {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.clone(),
        }
    }
}

/// Server-side session storage keyed by the opaque cookie id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Live session for `id`; expired rows read as absent.
    async fn get(&self, id: &str) -> anyhow::Result<Option<SessionData>>;
    /// Insert or replace the session, live until `expires_at`.
    async fn set(&self, id: &str, data: &SessionData, expires_at: OffsetDateTime)
        -> anyhow::Result<()>;
    async fn destroy(&self, id: &str) -> anyhow::Result<()>;
    /// Drop every expired row, returning how many went.
    async fn purge_expired(&self) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<SessionData>> {
        let row: Option<(Json<SessionData>,)> = sqlx::query_as(
            r#"
            SELECT data
            FROM sessions
            WHERE id = $1 AND expires_at > now()
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(|(Json(data),)| data))
    }

    async fn set(
        &self,
        id: &str,
        data: &SessionData,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, data, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(id)
        .bind(Json(data))
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

/// In-process session store, selected with `DATABASE_URL=memory` and used by tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (SessionData, OffsetDateTime)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<SessionData>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|(_, expires_at)| *expires_at > OffsetDateTime::now_utc())
            .map(|(data, _)| data.clone()))
    }

    async fn set(
        &self,
        id: &str,
        data: &SessionData,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        self.sessions
            .write()
            .await
            .insert(id.to_string(), (data.clone(), expires_at));
        Ok(())
    }

    async fn destroy(&self, id: &str) -> anyhow::Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(role: &str) -> SessionData {
        SessionData {
            user_id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: role.into(),
        }
    }

    #[tokio::test]
    async fn set_get_destroy() {
        let store = MemorySessionStore::new();
        let session = data("user");
        let expires = OffsetDateTime::now_utc() + time::Duration::hours(2);
        store.set("abc", &session, expires).await.unwrap();
        assert_eq!(store.get("abc").await.unwrap(), Some(session));
        store.destroy("abc").await.unwrap();
        assert!(store.get("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_read_as_absent_and_get_purged() {
        let store = MemorySessionStore::new();
        let past = OffsetDateTime::now_utc() - time::Duration::seconds(1);
        let future = OffsetDateTime::now_utc() + time::Duration::hours(1);
        store.set("old", &data("user"), past).await.unwrap();
        store.set("new", &data("user"), future).await.unwrap();

        assert!(store.get("old").await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("new").await.unwrap().is_some());
    }

    #[test]
    fn admin_check_is_exact() {
        assert!(data("admin").is_admin());
        assert!(!data("Admin").is_admin());
        assert!(!data("user").is_admin());
    }
}
