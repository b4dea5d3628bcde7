use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stationflow_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "transfer store failure");
    if err.is_unavailable() {
        json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", err.to_string())
    } else {
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
    }
}

/// Malformed bodies are a client error (400), never axum's default 422.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    validation_error(rejection.body_text())
}

pub fn validation_error(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
