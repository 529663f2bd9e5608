//! HTTP request handlers
//!
//! Axum handlers for the data-point dashboard API.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use exam_tracker_core::{DataPoint, DataPointSummary, InsertDataPoint, ValidationIssue};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    };

    (StatusCode::OK, Json(health))
}

/// List all data points
pub async fn list_data_points(
    State(state): State<AppState>,
) -> Result<Json<Vec<DataPoint>>, ApiError> {
    let points = state.db()?.list_data_points()?;
    Ok(Json(points))
}

/// Create a data point.
///
/// The body is validated by hand so that a failure reports only the first
/// problem as `{message, field}`.
pub async fn create_data_point(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<DataPoint>), ApiError> {
    let Json(body) =
        body.map_err(|rejection| ApiError::Validation(ValidationIssue::new(rejection.body_text(), "")))?;

    let input = InsertDataPoint::validate(&body).map_err(ApiError::Validation)?;
    let point = state.db()?.create_data_point(&input)?;
    tracing::debug!(id = point.id, label = %point.label, "data point created");

    Ok((StatusCode::CREATED, Json(point)))
}

/// Dashboard header aggregates
pub async fn data_point_summary(
    State(state): State<AppState>,
) -> Result<Json<DataPointSummary>, ApiError> {
    let points = state.db()?.list_data_points()?;
    Ok(Json(DataPointSummary::from_points(&points)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use exam_tracker_core::Database;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, Json(body)) = health_check(State(test_state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
    }

    #[tokio::test]
    async fn test_create_data_point() {
        let state = test_state();
        let body = json!({"label": "Jun", "value": 700});

        let (status, Json(point)) = create_data_point(State(state.clone()), Ok(Json(body)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(point.label, "Jun");
        assert_eq!(point.value, 700);

        let Json(points) = list_data_points(State(state)).await.unwrap();
        assert_eq!(points, vec![point]);
    }

    #[tokio::test]
    async fn test_create_data_point_validation() {
        let state = test_state();
        let body = json!({"label": "Jun", "value": "lots"});

        let err = create_data_point(State(state.clone()), Ok(Json(body)))
            .await
            .unwrap_err();
        match &err {
            ApiError::Validation(issue) => {
                assert_eq!(issue.field, "value");
                assert_eq!(issue.message, "Expected number, received string");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let Json(points) = list_data_points(State(state)).await.unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_value_beyond_int32_and_summary_stays_sane() {
        let state = test_state();
        let body = json!({"label": "A", "value": 9223372036854775807i64});

        let err = create_data_point(State(state.clone()), Ok(Json(body)))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        for value in [i32::MAX, 1] {
            create_data_point(State(state.clone()), Ok(Json(json!({"label": "A", "value": value}))))
                .await
                .unwrap();
        }
        let Json(summary) = data_point_summary(State(state)).await.unwrap();
        assert_eq!(summary.total, i64::from(i32::MAX) + 1);
    }

    #[tokio::test]
    async fn test_list_after_seed() {
        let state = test_state();
        state.db().unwrap().seed_data_points_if_empty().unwrap();

        let Json(points) = list_data_points(State(state)).await.unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].label, "Jan");
        assert_eq!(points[0].value, 400);
    }

    #[tokio::test]
    async fn test_summary() {
        let state = test_state();
        state.db().unwrap().seed_data_points_if_empty().unwrap();

        let Json(summary) = data_point_summary(State(state)).await.unwrap();
        assert_eq!(summary.total, 2600);
        assert_eq!(summary.average, 520);
        assert_eq!(summary.highest.unwrap().label, "Apr");
    }
}
