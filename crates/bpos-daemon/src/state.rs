//! Shared runtime state for bpos-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum; this module owns nothing
//! async itself. The broadcast bus feeds the SSE stream that menu boards and
//! customer displays subscribe to.

use std::time::Duration;

use bpos_placement::PlacementOptions;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BusMsg — SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    OrderCommitted { order_id: i64, total_cost: f64, line_count: usize },
    LogLine { level: String, msg: String },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// Connection pool; sqlx pools are internally Arc'd.
    pub pool: PgPool,
    /// Retry knobs handed to every placement.
    pub placement: PlacementOptions,
}

impl AppState {
    pub fn new(pool: PgPool, placement: PlacementOptions) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        Self {
            bus,
            build: BuildInfo {
                service: "bpos-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            pool,
            placement,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
