//!
//! danawarga HTTP server
//! ---------------------
//! Axum-based login endpoint the front end authenticates against. It resolves a
//! credential pair against the user directory and returns the identity; it does not
//! keep sessions itself (those live in client storage).
//!
//! Responsibilities:
//! - `POST /api/auth/login` with `{mode, selector, password}`.
//! - Health text on `/`.
//! - Startup logging of the configuration in effect.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::identity::{Authenticator, LocalAuthenticator, LoginRequest};
use crate::security::UserDirectory;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<dyn Authenticator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "danawarga ok" }))
        .route("/api/auth/login", post(login))
        .with_state(state)
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> impl IntoResponse {
    match state.authenticator.authenticate(&payload).await {
        Ok(Some(user)) => {
            info!(user = %user.id, role = user.role.as_str(), "login accepted");
            (StatusCode::OK, Json(serde_json::json!({"status":"ok","user": user})))
        }
        Ok(None) => (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"status":"unauthorized"}))),
        Err(e) => {
            error!("login error: {e}");
            let app: AppError = e.into();
            let status = StatusCode::from_u16(app.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(serde_json::json!({"status":"error","error": app})))
        }
    }
}

/// Bind and serve until the listener fails.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Starting server on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn run_with_config(config: AppConfig) -> anyhow::Result<()> {
    info!(
        target: "startup",
        "danawarga starting: http_port={}, data_dir={:?}, users_file={:?}, idle_timeout_secs={}, petugas_idle_timeout_secs={:?}",
        config.http_port,
        config.data_dir,
        config.users_file,
        config.idle_timeout.as_secs(),
        config.petugas_idle_timeout.map(|d| d.as_secs())
    );
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create or access data dir: {}", config.data_dir.display()))?;
    let directory = UserDirectory::load(&config.users_file)
        .with_context(|| format!("While loading user directory: {}", config.users_file.display()))?;
    let state = AppState { authenticator: Arc::new(LocalAuthenticator::new(directory)) };

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, state).await
}

/// Convenience entry point reading configuration from the environment.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(AppConfig::from_env()).await
}
