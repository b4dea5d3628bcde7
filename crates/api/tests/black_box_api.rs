use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use stationflow_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn post_events(&self, client: &reqwest::Client, events: Value) -> reqwest::Response {
        client
            .post(format!("{}/transfers", self.base_url))
            .json(&json!({ "events": events }))
            .send()
            .await
            .unwrap()
    }

    async fn summary(&self, client: &reqwest::Client, station: &str) -> reqwest::Response {
        client
            .get(format!("{}/stations/{}/summary", self.base_url, station))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn make_event(overrides: Value) -> Value {
    let mut event = json!({
        "event_id": "evt-001",
        "station_id": "S1",
        "amount": 100.0,
        "status": "approved",
        "created_at": "2026-02-19T10:00:00Z",
    });
    if let (Some(base), Some(extra)) = (event.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    event
}

#[tokio::test]
async fn batch_insert_counts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = srv
        .post_events(
            &client,
            json!([
                make_event(json!({ "event_id": "evt-001" })),
                make_event(json!({ "event_id": "evt-002" })),
                make_event(json!({ "event_id": "evt-001" })),
            ]),
        )
        .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["duplicates"], 1);
}

#[tokio::test]
async fn duplicate_submission_does_not_change_totals() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let events = json!([make_event(json!({ "event_id": "evt-001", "amount": 100.0 }))]);

    let first = srv.post_events(&client, events.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = srv.post_events(&client, events).await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["inserted"], 0);
    assert_eq!(body["duplicates"], 1);

    let res = srv.summary(&client, "S1").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["station_id"], "S1");
    assert_eq!(body["total_approved_amount"].as_f64(), Some(100.0));
    assert_eq!(body["events_count"], 1);
}

#[tokio::test]
async fn out_of_order_arrival_gives_same_totals() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = srv
        .post_events(
            &client,
            json!([
                make_event(json!({ "event_id": "evt-003", "amount": 50.0, "created_at": "2026-02-19T12:00:00Z" })),
                make_event(json!({ "event_id": "evt-001", "amount": 25.0, "created_at": "2026-02-19T08:00:00Z" })),
                make_event(json!({ "event_id": "evt-002", "amount": 75.0, "created_at": "2026-02-19T10:00:00Z" })),
            ]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = srv.summary(&client, "S1").await.json().await.unwrap();
    assert_eq!(body["total_approved_amount"].as_f64(), Some(150.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_do_not_double_count() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let events = json!([make_event(json!({ "event_id": "evt-001", "amount": 100.0 }))]);

    let (a, b, c) = tokio::join!(
        srv.post_events(&client, events.clone()),
        srv.post_events(&client, events.clone()),
        srv.post_events(&client, events.clone()),
    );

    let mut total_inserted = 0;
    for res in [a, b, c] {
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        total_inserted += body["inserted"].as_u64().unwrap();
    }
    assert_eq!(total_inserted, 1);

    let body: Value = srv.summary(&client, "S1").await.json().await.unwrap();
    assert_eq!(body["total_approved_amount"].as_f64(), Some(100.0));
    assert_eq!(body["events_count"], 1);
}

#[tokio::test]
async fn summary_only_sums_approved_per_station() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.post_events(
        &client,
        json!([
            make_event(json!({ "event_id": "s1-a", "station_id": "S1", "amount": 100.0, "status": "approved" })),
            make_event(json!({ "event_id": "s1-b", "station_id": "S1", "amount": 50.0, "status": "pending" })),
            make_event(json!({ "event_id": "s2-a", "station_id": "S2", "amount": 200.0, "status": "approved" })),
        ]),
    )
    .await;

    let s1: Value = srv.summary(&client, "S1").await.json().await.unwrap();
    assert_eq!(s1["total_approved_amount"].as_f64(), Some(100.0));
    assert_eq!(s1["events_count"], 2);

    let s2: Value = srv.summary(&client, "S2").await.json().await.unwrap();
    assert_eq!(s2["total_approved_amount"].as_f64(), Some(200.0));
    assert_eq!(s2["events_count"], 1);
}

#[tokio::test]
async fn station_without_approved_events_reports_zero() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.post_events(
        &client,
        json!([make_event(json!({ "event_id": "p1", "station_id": "S9", "status": "pending" }))]),
    )
    .await;

    let res = srv.summary(&client, "S9").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total_approved_amount"].as_f64(), Some(0.0));
    assert_eq!(body["events_count"], 1);
}

#[tokio::test]
async fn missing_field_fails_fast_with_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = srv
        .post_events(
            &client,
            json!([{
                "station_id": "S1",
                "amount": 50.0,
                "status": "approved",
                "created_at": "2026-02-19T10:00:00Z"
            }]),
        )
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn negative_amount_rejects_whole_batch() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = srv
        .post_events(
            &client,
            json!([
                make_event(json!({ "event_id": "ok-1" })),
                make_event(json!({ "event_id": "bad", "amount": -1.0 })),
            ]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // nothing from the rejected batch was stored
    let res = srv.summary(&client, "S1").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn string_amount_rounding_past_the_limit_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = srv
        .post_events(
            &client,
            json!([make_event(json!({ "amount": "99999999999999.99995" }))]),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = srv.summary(&client, "S1").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // a string amount inside the limit is accepted as-is
    let res = srv
        .post_events(&client, json!([make_event(json!({ "amount": "12.5" }))]))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = srv.summary(&client, "S1").await.json().await.unwrap();
    assert_eq!(body["total_approved_amount"].as_f64(), Some(12.5));
}

#[tokio::test]
async fn blank_status_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = srv
        .post_events(&client, json!([make_event(json!({ "status": "  " }))]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400_not_422() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/transfers", srv.base_url))
        .header("content-type", "application/json")
        .body("{\"events\": [")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn station_not_found_returns_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = srv.summary(&client, "NONEXISTENT").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn stored_transfer_keeps_first_payload() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.post_events(&client, json!([make_event(json!({ "event_id": "evt-x", "amount": 10.5 }))]))
        .await;
    srv.post_events(
        &client,
        json!([make_event(json!({ "event_id": "evt-x", "amount": 99.0, "status": "pending" }))]),
    )
    .await;

    let res = client
        .get(format!("{}/transfers/evt-x", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["amount"].as_f64(), Some(10.5));
    assert_eq!(body["status"], "approved");
    assert!(body["ingested_at"].is_string());

    let res = client
        .get(format!("{}/transfers/missing", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_backend() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["store"], "in_memory");
}
