//! Cookie-referenced server-side sessions.
//!
//! The cookie only carries an opaque id; the user snapshot lives in a
//! [`SessionStore`]. Every write renews the cookie and the row expiry.

pub mod store;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{distributions::Alphanumeric, Rng};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{config::SessionConfig, state::AppState};
pub use store::{MemorySessionStore, PgSessionStore, SessionData, SessionStore};

const SESSION_ID_LEN: usize = 64;

/// Generate a cryptographically secure session id.
pub fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Row expiry for a write happening at `now`: the cookie lifetime, capped by the store TTL.
pub fn expiry_from(cfg: &SessionConfig, now: OffsetDateTime) -> OffsetDateTime {
    now + cfg.ttl().min(cfg.store_ttl())
}

pub fn session_cookie(cfg: &SessionConfig, id: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cfg.secure_cookie)
        .max_age(cfg.ttl())
        .build()
}

pub fn removal_cookie(cfg: &SessionConfig) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), "")).path("/").build()
}

/// Session id carried by the request, if any.
pub fn session_id(cfg: &SessionConfig, jar: &CookieJar) -> Option<String> {
    jar.get(&cfg.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Start a fresh session for `data`, discarding whatever session the request carried.
///
/// A failure to destroy the old row only leaves it to expire; the new
/// session is issued regardless.
pub async fn start(
    state: &AppState,
    jar: CookieJar,
    data: &SessionData,
) -> anyhow::Result<CookieJar> {
    let cfg = &state.config.session;
    if let Some(old) = session_id(cfg, &jar) {
        if let Err(e) = state.sessions.destroy(&old).await {
            warn!(error = %e, user_id = %data.user_id, "stale session not destroyed");
        }
    }
    let id = generate_session_id();
    state
        .sessions
        .set(&id, data, expiry_from(cfg, OffsetDateTime::now_utc()))
        .await?;
    debug!(user_id = %data.user_id, "session started");
    Ok(jar.add(session_cookie(cfg, id)))
}

/// Persist changed session data under the existing id and renew its cookie.
pub async fn save(
    state: &AppState,
    jar: CookieJar,
    id: &str,
    data: &SessionData,
) -> anyhow::Result<CookieJar> {
    let cfg = &state.config.session;
    state
        .sessions
        .set(id, data, expiry_from(cfg, OffsetDateTime::now_utc()))
        .await?;
    Ok(jar.add(session_cookie(cfg, id.to_string())))
}
