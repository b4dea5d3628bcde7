use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use stationflow_core::EventId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /transfers`: validate the whole batch, then ingest it.
pub async fn post_transfers(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::BatchTransferRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let events = match body.into_validated() {
        Ok(events) => events,
        Err(resp) => return resp,
    };

    let outcome = match services.coordinator().ingest_batch(&events).await {
        Ok(o) => o,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(dto::BatchTransferResponse::from(outcome)),
    )
        .into_response()
}

/// `GET /transfers/:event_id`: the event as first stored.
pub async fn get_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(event_id) = EventId::new(id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "transfer not found");
    };

    match services.coordinator().transfer(&event_id).await {
        Ok(Some(stored)) => (StatusCode::OK, Json(dto::TransferResponse::from(stored))).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no transfer with event_id '{event_id}'"),
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}
