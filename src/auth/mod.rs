use crate::state::AppState;
use axum::Router;

mod dto;
pub mod guard;
pub mod handlers;
pub mod password;
pub(crate) mod services;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
