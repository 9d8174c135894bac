//! In-process scenario tests for bpos-daemon HTTP endpoints that need no
//! database.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot` — no network I/O required. The pool behind
//! the state is lazy and unreachable, which doubles as proof that input
//! validation rejects bad submissions before any storage access.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use bpos_daemon::{routes, state};
use bpos_placement::PlacementOptions;
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a fresh in-process router backed by an unreachable lazy pool.
fn make_router() -> axum::Router {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://nobody@127.0.0.1:1/void")
        .expect("lazy pool construction is infallible");
    let st = Arc::new(state::AppState::new(pool, PlacementOptions::default()));
    routes::build_router(st)
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

/// Parse body bytes as a `serde_json::Value`.
fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let router = make_router();
    let req = Request::builder()
        .method("GET")
        .uri("/v1/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "bpos-daemon");
}

// ---------------------------------------------------------------------------
// POST /v1/orders — invalid submissions refused before storage access
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_order_returns_400_without_touching_storage() {
    let router = make_router();
    let req = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            r#"{"employee_id": 1, "total_cost": 0.0, "order_week": 32, "items": []}"#,
        ))
        .unwrap();

    // The pool is unreachable: any storage access would surface as a 500.
    let (status, body) = call(router, req).await;
    assert_eq!(
        status,
        StatusCode::BAD_REQUEST,
        "empty item list must be a 400 before any storage access"
    );

    let json = parse_json(body);
    assert_eq!(json["reason"], "invalid_input");
    assert!(
        json["error"]
            .as_str()
            .unwrap_or("")
            .contains("at least one item"),
        "body should name the problem: {json}"
    );
}

#[tokio::test]
async fn zero_quantity_order_returns_400() {
    let router = make_router();
    let req = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            r#"{"employee_id": 1, "total_cost": 4.75, "order_week": 32,
                "items": [{"menu_item_id": 7, "quantity": 0}]}"#,
        ))
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["reason"], "invalid_input");
}

// ---------------------------------------------------------------------------
// Unknown routes return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let router = make_router();
    let req = Request::builder()
        .method("GET")
        .uri("/v1/does_not_exist")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, _) = call(router, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
