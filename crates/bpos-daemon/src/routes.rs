//! Axum router and all HTTP handlers for bpos-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use bpos_placement::{place_order, PlacementOutcome, RejectReason};
use bpos_schemas::OrderSubmission;
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info};

use crate::{
    api_types::{
        HealthResponse, InventoryResponse, OrderFailedResponse, OrderPlacedResponse,
        OrderRefusedResponse, OrdersResponse,
    },
    state::{AppState, BusMsg},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/orders", get(list_orders).post(create_order))
        .route("/v1/inventory", get(inventory))
        .route("/v1/stream", get(stream))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

/// Place an order.
///
/// Status mapping mirrors the placement outcome surface:
/// - 201 Created — committed; body carries the persisted order + lines.
/// - 400 Bad Request — invalid input (rejected before storage access).
/// - 409 Conflict — insufficient inventory; body names the short ingredients.
/// - 500 — infrastructure failure after bounded retries; logged, detail-free
///   on the wire.
pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    Json(submission): Json<OrderSubmission>,
) -> Response {
    match place_order(&st.pool, &submission, &st.placement).await {
        Ok(PlacementOutcome::Committed(placed)) => {
            info!(order_id = placed.order.order_id, "order placed");
            let _ = st.bus.send(BusMsg::OrderCommitted {
                order_id: placed.order.order_id,
                total_cost: placed.order.total_cost,
                line_count: placed.lines.len(),
            });
            (
                StatusCode::CREATED,
                Json(OrderPlacedResponse {
                    order: placed.order,
                    lines: placed.lines,
                }),
            )
                .into_response()
        }
        Ok(PlacementOutcome::Rejected(RejectReason::InvalidInput { reason })) => (
            StatusCode::BAD_REQUEST,
            Json(OrderRefusedResponse {
                error: reason,
                reason: "invalid_input".to_string(),
                ingredient_ids: Vec::new(),
            }),
        )
            .into_response(),
        Ok(PlacementOutcome::Rejected(RejectReason::InsufficientInventory {
            ingredient_ids,
        })) => (
            StatusCode::CONFLICT,
            Json(OrderRefusedResponse {
                error: format!(
                    "insufficient inventory for ingredient id(s): {ingredient_ids:?}"
                ),
                reason: "insufficient_inventory".to_string(),
                ingredient_ids,
            }),
        )
            .into_response(),
        Err(err) => {
            error!(error = ?err, "order placement failed");
            let _ = st.bus.send(BusMsg::LogLine {
                level: "ERROR".to_string(),
                msg: "order placement failed; see daemon log".to_string(),
            });
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(OrderFailedResponse {
                    error: "order could not be processed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/orders
// ---------------------------------------------------------------------------

pub(crate) async fn list_orders(State(st): State<Arc<AppState>>) -> Response {
    match bpos_db::orders::list_recent_orders(&st.pool, 100).await {
        Ok(orders) => (StatusCode::OK, Json(OrdersResponse { orders })).into_response(),
        Err(err) => {
            error!(error = ?err, "list_orders failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(OrderFailedResponse {
                    error: "orders could not be listed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/inventory
// ---------------------------------------------------------------------------

pub(crate) async fn inventory(State(st): State<Arc<AppState>>) -> Response {
    match bpos_db::inventory::list_inventory(&st.pool).await {
        Ok(items) => (StatusCode::OK, Json(InventoryResponse { items })).into_response(),
        Err(err) => {
            error!(error = ?err, "inventory listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(OrderFailedResponse {
                    error: "inventory could not be listed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::OrderCommitted { .. } => "order",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
