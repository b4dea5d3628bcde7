use axum::{
    Router,
    routing::{get, post},
};

pub mod stations;
pub mod system;
pub mod transfers;

/// Router for all transfer and station endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/transfers", post(transfers::post_transfers))
        .route("/transfers/:event_id", get(transfers::get_transfer))
        .route("/stations/:station_id/summary", get(stations::get_station_summary))
}
