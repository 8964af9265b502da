//! HTTP server: read-only JSON view of the store plus the browser viewer.
//!
//! | Route          | Response                                             |
//! |----------------|------------------------------------------------------|
//! | `GET /api/logs`   | `[{count, timestamp, message}]`, highest count first |
//! | `GET /api/health` | [`HealthSummary`] of the current table               |
//! | anything else  | static file from `static_dir`, or the built-in viewer |
//!
//! The store is re-read on every request. Unreadable or half-written files
//! are served as an empty table rather than an error.

use anyhow::{anyhow, Result};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use healthbar_core::{log_views, HealthSummary, LogEntry, LogView, Store};
use serde_json::json;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::fs;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub max_health: u64,
    /// Served for non-API paths when set; otherwise only the embedded
    /// viewer is available.
    pub static_dir: Option<PathBuf>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/logs", get(api_logs))
        .route("/api/health", get(api_health))
        .fallback(get(static_fallback))
        .with_state(state)
}

pub async fn run_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let bind = format!("{host}:{port}")
        .parse::<SocketAddr>()
        .map_err(|err| anyhow!("invalid bind address: {err}"))?;

    let listener = tokio::net::TcpListener::bind(bind).await.map_err(|error| {
        if error.kind() == ErrorKind::AddrInUse {
            anyhow!("failed to bind {bind}: address already in use. stop the other viewer or pass --port <free-port>")
        } else {
            anyhow!("failed to bind {bind}: {error}")
        }
    })?;

    tracing::info!(%bind, store = %state.store.path().display(), "serving health log");
    println!("healthbar viewer running at http://{bind}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn read_entries(store: &Store) -> Vec<LogEntry> {
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.load_or_empty())
        .await
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "store read task failed");
            Vec::new()
        })
}

async fn api_logs(State(state): State<AppState>) -> Json<Vec<LogView>> {
    let entries = read_entries(&state.store).await;
    Json(log_views(&entries))
}

async fn api_health(State(state): State<AppState>) -> Json<HealthSummary> {
    let entries = read_entries(&state.store).await;
    Json(HealthSummary::from_entries(&entries, state.max_health))
}

fn json_error(message: &str, status: StatusCode) -> Response {
    (status, Json(json!({ "ok": false, "error": message }))).into_response()
}

async fn static_fallback(State(state): State<AppState>, uri: Uri) -> Response {
    let requested = uri.path();
    if requested.contains("..") {
        return json_error("forbidden", StatusCode::FORBIDDEN);
    }

    let Some(static_dir) = state.static_dir.as_ref() else {
        return match requested {
            "/" | "/index.html" => Html(INDEX_HTML).into_response(),
            _ => json_error("not found", StatusCode::NOT_FOUND),
        };
    };

    let mut target = static_dir.join(requested.trim_start_matches('/'));
    if requested == "/" || target.is_dir() {
        target.push("index.html");
    }

    let canonical_root = match fs::canonicalize(static_dir).await {
        Ok(path) => path,
        Err(error) => {
            return json_error(
                &format!("static directory unavailable: {error}"),
                StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
    };
    let canonical_file = match fs::canonicalize(&target).await {
        Ok(path) => path,
        Err(_) => return json_error("not found", StatusCode::NOT_FOUND),
    };
    if !canonical_file.starts_with(&canonical_root) {
        return json_error("forbidden", StatusCode::FORBIDDEN);
    }

    match fs::read(&canonical_file).await {
        Ok(bytes) => {
            let content_type = mime_guess::from_path(&canonical_file)
                .first_or_octet_stream()
                .essence_str()
                .to_string();
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(error) => json_error(
            &format!("failed to read file: {error}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}
