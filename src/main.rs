mod app;
mod auth;
mod config;
mod error;
mod pages;
mod sessions;
mod state;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "userdesk=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    match app_state.sessions.purge_expired().await {
        Ok(n) => tracing::info!(purged = n, "expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "session purge failed; continuing"),
    }

    app::serve(app::build_app(app_state)).await
}
