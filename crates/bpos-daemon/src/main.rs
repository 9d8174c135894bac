//! bpos-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, connects the pool,
//! builds the shared state, wires middleware, and starts the HTTP server.
//! All route handlers live in `routes.rs`; all shared state types live in
//! `state.rs`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use bpos_daemon::{routes, state};
use bpos_placement::PlacementOptions;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let settings = load_settings()?;
    let placement = PlacementOptions {
        max_attempts: settings.placement.max_attempts,
        backoff_base: Duration::from_millis(settings.placement.backoff_base_ms),
    };

    // Fail fast: a POS terminal with no database has nothing to offer.
    let pool = bpos_db::connect_from_env_with_max(settings.daemon.db_max_connections)
        .await
        .context("daemon boot requires a reachable database")?;
    bpos_db::migrate(&pool).await?;

    let shared = Arc::new(state::AppState::new(pool, placement));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr(&settings.daemon)
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8900)));
    info!("bpos-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

struct Settings {
    placement: bpos_config::PlacementSettings,
    daemon: bpos_config::DaemonSettings,
}

/// Layered config from BPOS_CONFIG (comma-separated YAML paths, base first).
/// With no config given, everything runs on documented defaults.
fn load_settings() -> anyhow::Result<Settings> {
    let config_json = match std::env::var("BPOS_CONFIG") {
        Ok(paths) => {
            let paths: Vec<&str> = paths.split(',').map(str::trim).collect();
            let loaded = bpos_config::load_layered_yaml(&paths)?;
            info!(config_hash = %loaded.config_hash, "config loaded");
            loaded.config_json
        }
        Err(_) => serde_json::json!({}),
    };

    Ok(Settings {
        placement: bpos_config::PlacementSettings::from_config_json(&config_json)?,
        daemon: bpos_config::DaemonSettings::from_config_json(&config_json)?,
    })
}

fn bind_addr(daemon: &bpos_config::DaemonSettings) -> Option<SocketAddr> {
    // Env var wins over config.
    if let Ok(addr) = std::env::var("BPOS_DAEMON_ADDR") {
        return addr.parse().ok();
    }
    daemon.bind_addr.as_ref()?.parse().ok()
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// CORS: allow only localhost origins (cashier terminals and menu boards run
/// on the shop LAN behind the daemon host).
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
