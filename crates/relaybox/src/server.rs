// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP health and statistics endpoint built on axum.
//!
//! - `GET /` reports liveness, uptime and storage health.
//! - `GET /stats` returns aggregate file statistics.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use relaybox_config::model::ServerConfig;
use relaybox_core::types::HealthStatus;
use relaybox_core::{MetadataStore, PluginAdapter, RelayboxError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetadataStore>,
    pub started: Instant,
}

/// Response body for `GET /`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub storage: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, storage) = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => ("ok", "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => ("degraded", reason),
        Ok(HealthStatus::Unhealthy(reason)) => ("unhealthy", reason),
        Err(e) => ("unhealthy", e.to_string()),
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        storage,
    })
}

async fn get_stats(State(state): State<AppState>) -> Response {
    match state.store.aggregate_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            warn!(error = %e, "stats query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "statistics unavailable".into(),
                }),
            )
                .into_response()
        }
    }
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_health))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), RelayboxError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            RelayboxError::Internal(format!("failed to bind HTTP server to {addr}: {e}"))
        })?;

    info!("HTTP server listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| RelayboxError::Internal(format!("HTTP server error: {e}")))?;

    info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use relaybox_config::model::StorageConfig;
    use relaybox_core::types::{FileType, NewFileRecord, RelayRef};
    use relaybox_storage::SqliteStorage;
    use tower::ServiceExt;

    async fn state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("server.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        let state = AppState {
            store: Arc::new(storage),
            started: Instant::now(),
        };
        (state, dir)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (state, _dir) = state().await;
        let (status, body) = get_json(router(state), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn health_reports_uninitialized_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("never.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        let state = AppState {
            store: Arc::new(storage),
            started: Instant::now(),
        };
        let (status, body) = get_json(router(state), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["status"], "ok");
    }

    #[tokio::test]
    async fn stats_returns_totals() {
        let (state, _dir) = state().await;
        state
            .store
            .insert_file(&NewFileRecord {
                file_id: "12345678ABCDEF".into(),
                filename: "report.pdf".into(),
                file_size: 1024,
                file_type: FileType::Document,
                mime_type: Some("application/pdf".into()),
                relay_ref: RelayRef {
                    channel_id: -100,
                    message_id: 1,
                },
                owner_user_id: Some(42),
                is_private: false,
            })
            .await
            .unwrap();

        let (status, body) = get_json(router(state), "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_files"], 1);
        assert_eq!(body["total_size"], 1024);
        assert_eq!(body["counts_by_type"]["document"], 1);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (state, _dir) = state().await;
        let response = router(state)
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
