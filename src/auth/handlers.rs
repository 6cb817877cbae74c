use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        guard::LOGIN_PATH,
        password::{credentials_match, hash_password},
        services::{is_valid_email, present, supplied},
    },
    error::{AppError, AppJson, MessageResponse},
    pages::handlers::{login_page, register_page},
    sessions::{self, SessionData},
    state::AppState,
    users::repo::StoreError,
    users::repo_types::{NewUser, ADMIN_ROLE},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<MessageResponse>), AppError> {
    let (
        Some(first_name),
        Some(last_name),
        Some(phone_number),
        Some(address),
        Some(role),
        Some(email),
        Some(password),
    ) = (
        supplied(payload.first_name),
        supplied(payload.last_name),
        supplied(payload.phone_number),
        supplied(payload.address),
        supplied(payload.role),
        supplied(payload.email),
        present(payload.password),
    )
    else {
        warn!("registration with missing fields");
        return Err(AppError::Validation("All fields are required".into()));
    };

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    if role == ADMIN_ROLE && !state.config.allow_admin_signup {
        warn!(email = %email, "self-assigned admin role refused");
        return Err(AppError::Forbidden("Admin role cannot be self-assigned".into()));
    }

    // Ensure email is not taken
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Validation("Email already registered".into()));
    }

    let password_hash = hash_password(&password)?;

    let user = match state
        .users
        .create(NewUser {
            first_name,
            last_name,
            phone_number,
            address,
            role,
            email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::DuplicateEmail) => {
            warn!("email registered concurrently");
            return Err(AppError::Validation("Email already registered".into()));
        }
        Err(StoreError::Other(e)) => {
            error!(error = %e, "create user failed");
            return Err(AppError::Internal(e));
        }
    };

    let jar = sessions::start(&state, jar, &SessionData::from(&user)).await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let (Some(email), Some(password)) = (supplied(payload.email), present(payload.password))
    else {
        return Err(AppError::Validation("Email and password are required".into()));
    };

    let user = match state.users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::NotFound("User not found".into()));
        }
    };

    if !credentials_match(&user, &password)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    let jar = sessions::start(&state, jar, &SessionData::from(&user)).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((jar, Json(MessageResponse::new("Login successful"))))
}

/// The cookie is cleared whatever happens to the stored session.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let cfg = &state.config.session;
    let id = sessions::session_id(cfg, &jar);
    let jar = jar.remove(sessions::removal_cookie(cfg));

    if let Some(id) = id {
        if let Err(e) = state.sessions.destroy(&id).await {
            error!(error = %e, "session destroy failed");
            return (jar, Redirect::to("/dashboard")).into_response();
        }
        info!("session destroyed");
    }

    (jar, Redirect::to(LOGIN_PATH)).into_response()
}
