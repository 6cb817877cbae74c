use axum::{response::Html, routing::get, Router};

use crate::{
    auth::guard::{AuthSession, MaybeSession},
    error::AppError,
    pages::{
        render,
        templates::{DashboardTemplate, HomeTemplate, LoginTemplate, RegisterTemplate},
    },
    state::AppState,
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
}

pub async fn home(MaybeSession(session): MaybeSession) -> Result<Html<String>, AppError> {
    render(&HomeTemplate {
        logged_in: session.is_some(),
        first_name: session.map(|s| s.data.first_name),
    })
}

pub async fn register_page() -> Result<Html<String>, AppError> {
    render(&RegisterTemplate)
}

pub async fn login_page() -> Result<Html<String>, AppError> {
    render(&LoginTemplate)
}

pub async fn dashboard(AuthSession(session): AuthSession) -> Result<Html<String>, AppError> {
    let data = session.data;
    render(&DashboardTemplate {
        is_admin: data.is_admin(),
        first_name: data.first_name,
        last_name: data.last_name,
        email: data.email,
        role: data.role,
    })
}
