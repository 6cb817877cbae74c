//! Request gates.
//!
//! [`AuthSession`] requires a live session and sends everyone else to the
//! login page. [`AdminSession`] additionally requires the admin role and
//! answers 403 otherwise. [`MaybeSession`] never rejects on a missing
//! session; it only reads.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::{
    error::AppError,
    sessions::{self, SessionData},
    state::AppState,
};

pub const LOGIN_PATH: &str = "/login";

/// A live session found through the request cookie.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub data: SessionData,
}

pub enum GateRejection {
    Login,
    Forbidden,
    Store(anyhow::Error),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::Login => Redirect::to(LOGIN_PATH).into_response(),
            GateRejection::Forbidden => {
                AppError::Forbidden("Access denied: admins only".into()).into_response()
            }
            GateRejection::Store(e) => AppError::Internal(e).into_response(),
        }
    }
}

async fn lookup(parts: &Parts, state: &AppState) -> anyhow::Result<Option<CurrentSession>> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(id) = sessions::session_id(&state.config.session, &jar) else {
        return Ok(None);
    };
    let data = state.sessions.get(&id).await?;
    Ok(data.map(|data| CurrentSession { id, data }))
}

pub struct MaybeSession(pub Option<CurrentSession>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        lookup(parts, state)
            .await
            .map(MaybeSession)
            .map_err(GateRejection::Store)
    }
}

pub struct AuthSession(pub CurrentSession);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match lookup(parts, state).await {
            Ok(Some(session)) => Ok(AuthSession(session)),
            Ok(None) => Err(GateRejection::Login),
            Err(e) => Err(GateRejection::Store(e)),
        }
    }
}

pub struct AdminSession(pub CurrentSession);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthSession(session) = AuthSession::from_request_parts(parts, state).await?;
        if !session.data.is_admin() {
            warn!(user_id = %session.data.user_id, role = %session.data.role, "admin gate denied");
            return Err(GateRejection::Forbidden);
        }
        Ok(AdminSession(session))
    }
}
