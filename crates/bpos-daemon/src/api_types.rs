//! Request and response types for all bpos-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded by
//! Axum and decoded by tests. No business logic lives here; the request body
//! for POST /v1/orders is `bpos_schemas::OrderSubmission` itself.

use bpos_db::{IngredientRow, OrderLineRow, OrderRow};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

/// 201 body: the persisted order with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedResponse {
    pub order: OrderRow,
    pub lines: Vec<OrderLineRow>,
}

/// 400 / 409 body: why the order was refused.
///
/// `reason` is "invalid_input" or "insufficient_inventory";
/// `ingredient_ids` is populated only for the latter. Stock counts are never
/// included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRefusedResponse {
    pub error: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredient_ids: Vec<i64>,
}

/// 500 body: infrastructure failure. Deliberately detail-free; the cause is
/// in the daemon log, not the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFailedResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// GET /v1/orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderRow>,
}

// ---------------------------------------------------------------------------
// GET /v1/inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryResponse {
    pub items: Vec<IngredientRow>,
}
