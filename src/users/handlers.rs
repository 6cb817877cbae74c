use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        guard::{AdminSession, MaybeSession},
        password::hash_password,
        services::{is_valid_email, present, supplied},
    },
    error::{AppError, AppJson},
    pages::{render, templates::AdminUsersTemplate},
    sessions,
    state::AppState,
    users::{
        dto::{PublicUser, UpdateUserRequest, UpdateUserResponse},
        repo::StoreError,
        repo_types::UserChanges,
    },
};

// TODO: gate /update to admins or the account owner; it currently accepts any caller.
pub fn update_routes() -> Router<AppState> {
    Router::new().route("/update", post(update_user))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(admin_users))
}

/// Reads the target id: absent or blank is a 400, anything that is not a
/// uuid string is treated as an unknown user.
fn target_id(raw: Option<Value>) -> Result<Uuid, AppError> {
    let raw = match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    };
    let Some(raw) = raw else {
        return Err(AppError::Validation("User id is required".into()));
    };
    raw.as_str()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .ok_or_else(|| {
            warn!(id = %raw, "update with malformed id");
            AppError::NotFound("User not found".into())
        })
}

/// Partial update of a user. When the caller's own session belongs to the
/// updated user, only the session's role is re-synced; name and email stay
/// as they were captured at login.
#[instrument(skip(state, session, jar, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    jar: CookieJar,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<(CookieJar, Json<UpdateUserResponse>), AppError> {
    let id = target_id(payload.id)?;

    let email = supplied(payload.email);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            warn!(user_id = %id, email = %email, "update with invalid email");
            return Err(AppError::Validation("Invalid email".into()));
        }
    }

    let password_hash = match present(payload.password) {
        Some(plain) => Some(hash_password(&plain)?),
        None => None,
    };

    let changes = UserChanges {
        first_name: supplied(payload.first_name),
        last_name: supplied(payload.last_name),
        phone_number: supplied(payload.phone_number),
        address: supplied(payload.address),
        role: supplied(payload.role),
        email,
        password_hash,
    };

    let user = match state.users.update(id, changes).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_id = %id, "update unknown user");
            return Err(AppError::NotFound("User not found".into()));
        }
        Err(StoreError::DuplicateEmail) => {
            warn!(user_id = %id, "update to an email already in use");
            return Err(AppError::Validation("Email already registered".into()));
        }
        Err(StoreError::Other(e)) => {
            error!(error = %e, user_id = %id, "update user failed");
            return Err(AppError::Internal(e));
        }
    };

    let jar = match session {
        Some(mut current) if current.data.user_id == user.id => {
            current.data.role = user.role.clone();
            sessions::save(&state, jar, &current.id, &current.data).await?
        }
        _ => jar,
    };

    info!(user_id = %user.id, "user updated");
    Ok((
        jar,
        Json(UpdateUserResponse {
            message: "User updated successfully".into(),
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, session))]
pub async fn admin_users(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> Result<Html<String>, AppError> {
    let users: Vec<PublicUser> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    info!(admin_id = %session.data.user_id, count = users.len(), "admin user listing");
    render(&AdminUsersTemplate {
        viewer: session.data.first_name,
        users,
    })
}
