//! REST dashboard server.
//!
//! Thin pass-through over the `data_points` table:
//!
//! - `GET  /api/data-points`          list all points
//! - `POST /api/data-points`          create `{label, value}`
//! - `GET  /api/data-points/summary`  total / average / highest
//! - `GET  /health`

mod handlers;

pub use handlers::*;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use exam_tracker_core::db::DbError;
use exam_tracker_core::{Database, ValidationIssue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATA_POINTS_PATH: &str = "/api/data-points";

/// Server errors, each mapped to an HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationIssue),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of a non-validation error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(issue) => (StatusCode::BAD_REQUEST, Json(issue)).into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                let body = ErrorBody {
                    message: other.to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    started_at: Instant,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            started_at: Instant::now(),
        }
    }

    /// Lock the database for a single query.
    pub fn db(&self) -> Result<MutexGuard<'_, Database>, ApiError> {
        self.db
            .lock()
            .map_err(|e| ApiError::Internal(format!("Lock poisoned: {}", e)))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Build the dashboard router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(DATA_POINTS_PATH, get(list_data_points).post(create_data_point))
        .route("/api/data-points/summary", get(data_point_summary))
        .with_state(state)
}

/// Seed the table if empty and serve until Ctrl-C.
pub async fn serve(db: Database, addr: SocketAddr) -> std::io::Result<()> {
    match db.seed_data_points_if_empty() {
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "could not seed data points"),
    }

    let app = router(AppState::new(db));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_400() {
        let err = ApiError::Validation(ValidationIssue::new("Required", "label"));
        assert_eq!(err.to_string(), "Required");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_is_500() {
        let err = ApiError::Internal("boom".into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_serve_binds_and_seeds() {
        let db = Database::open_in_memory().unwrap();
        let handle = tokio::spawn(serve(db, "127.0.0.1:0".parse().unwrap()));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
