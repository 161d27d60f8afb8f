use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;
use tracing::error;

use super::{api_error, SharedDriver};
use crate::driver::LOG_ID_LEN;
use crate::types::{truncate_id, BypassSpec, BypassStatus};

/// Bypass session endpoints.
pub fn router(driver: SharedDriver) -> Router {
    Router::new()
        .route("/v1/bypass", get(list_bypass).post(start_bypass))
        .route("/v1/bypass/{id}", get(get_bypass).delete(stop_bypass))
        .layer(TraceLayer::new_for_http())
        .with_state(driver)
}

async fn list_bypass(State(driver): State<SharedDriver>) -> Json<Vec<BypassStatus>> {
    Json(driver.list_bypass().await)
}

async fn start_bypass(State(driver): State<SharedDriver>, Json(spec): Json<BypassSpec>) -> Response {
    if spec.id.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "bypass id must not be empty");
    }

    let id = spec.id.clone();
    // Runs to completion even if the client hangs up
    let started = tokio::spawn(async move { driver.start_bypass(spec).await }).await;
    match started {
        Ok(Ok(status)) => (StatusCode::CREATED, Json(status)).into_response(),
        Ok(Err(e)) => {
            error!(id = %truncate_id(&id, LOG_ID_LEN), error = %e, "failed to start bypass");
            e.into_response()
        }
        Err(e) => task_failed(&id, e),
    }
}

async fn get_bypass(State(driver): State<SharedDriver>, Path(id): Path<String>) -> Response {
    match driver.get_bypass(&id).await {
        Some(status) => Json(status).into_response(),
        None => api_error(
            StatusCode::NOT_FOUND,
            format!("bypass session {} not found", id),
        ),
    }
}

async fn stop_bypass(State(driver): State<SharedDriver>, Path(id): Path<String>) -> Response {
    // Runs to completion even if the client hangs up
    let stopped = tokio::spawn({
        let id = id.clone();
        async move { driver.stop_bypass(&id).await }
    })
    .await;
    match stopped {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(e)) => {
            if !e.is_not_found() {
                error!(id = %truncate_id(&id, LOG_ID_LEN), error = %e, "failed to stop bypass");
            }
            e.into_response()
        }
        Err(e) => task_failed(&id, e),
    }
}

fn task_failed(id: &str, e: JoinError) -> Response {
    error!(id = %truncate_id(id, LOG_ID_LEN), error = %e, "bypass task failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("bypass task failed: {}", e))
}
