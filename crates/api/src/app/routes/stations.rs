use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use stationflow_core::StationId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `GET /stations/:station_id/summary`.
pub async fn get_station_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let not_found = |id: &str| {
        errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("No events found for station '{id}'"),
        )
    };

    let Ok(station_id) = StationId::new(id.clone()) else {
        return not_found(&id);
    };

    match services.coordinator().station_summary(&station_id).await {
        Ok(Some(summary)) => {
            (StatusCode::OK, Json(dto::StationSummaryResponse::from(summary))).into_response()
        }
        Ok(None) => not_found(&id),
        Err(e) => errors::store_error_to_response(e),
    }
}
