use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::HashMap;
use tower_http::trace::TraceLayer;

use super::{api_error, SharedDriver};
use crate::types::ContainerInterfaces;

/// Interface reporting endpoints used by running helpers.
pub fn router(driver: SharedDriver) -> Router {
    Router::new()
        .route("/v1/interfaces", get(list_interfaces))
        .route(
            "/v1/interfaces/{id}",
            get(get_interface)
                .post(post_interface)
                .delete(delete_interface),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(driver)
}

async fn list_interfaces(
    State(driver): State<SharedDriver>,
) -> Json<HashMap<String, ContainerInterfaces>> {
    Json(driver.list_interfaces().await)
}

async fn get_interface(State(driver): State<SharedDriver>, Path(id): Path<String>) -> Response {
    match driver.get_interface(&id).await {
        Some(ifs) => Json(ifs).into_response(),
        None => api_error(
            StatusCode::NOT_FOUND,
            format!("no interfaces for container {}", id),
        ),
    }
}

async fn post_interface(
    State(driver): State<SharedDriver>,
    Path(id): Path<String>,
    Json(ifs): Json<ContainerInterfaces>,
) -> StatusCode {
    driver.post_interface(&id, ifs).await;
    StatusCode::NO_CONTENT
}

async fn delete_interface(State(driver): State<SharedDriver>, Path(id): Path<String>) -> StatusCode {
    driver.delete_interface(&id).await;
    StatusCode::NO_CONTENT
}
