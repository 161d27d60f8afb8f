//! HTTP surfaces of the daemon.
//!
//! `control` serves bypass sessions on the main socket, `com` takes interface
//! reports from running helpers on the socket passed to them as
//! `--com-socket`. Both are plain axum routers so they can be served over any
//! listener and exercised in tests without one.

pub mod com;
pub mod control;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::driver::Driver;
use crate::error::DriverError;

pub type SharedDriver = Arc<Driver>;

pub(crate) fn api_error(status: StatusCode, msg: impl Into<String>) -> Response {
    let body = serde_json::json!({
        "error": msg.into(),
    });
    (status, Json(body)).into_response()
}

impl IntoResponse for DriverError {
    fn into_response(self) -> Response {
        let status = match &self {
            DriverError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, self.to_string())
    }
}
