// Framework bootstrap for the arena server runtime.

use crate::domain::tuning::Tuning;
use crate::domain::world::GameSettings;
use crate::frameworks::config;
use crate::interface_adapters::clients::hub::HubClient;
use crate::interface_adapters::http::health_handler;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{room_task, Room, RoomEvent};

use axum::{http::HeaderValue, routing::get, Router};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tower_http::cors::{Any, CorsLayer};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer())
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking.
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([0, 0, 0, 0], config::port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn cors_layer() -> CorsLayer {
    let client_url = config::client_url();
    if client_url == "*" {
        return CorsLayer::new().allow_origin(Any);
    }
    match client_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!(%client_url, "invalid CLIENT_URL; allowing any origin");
            CorsLayer::new().allow_origin(Any)
        }
    }
}

fn build_state() -> Result<Arc<AppState>> {
    let hub_base_url = config::hub_base_url();
    let hub = HubClient::new(
        hub_base_url.clone(),
        config::hosted_game_key(),
        config::HUB_TIMEOUT,
    )
    .map_err(|e| std::io::Error::other(format!("failed to initialize hub client: {e}")))?;
    tracing::debug!(%hub_base_url, "hub client configured");

    // Channel wiring for the single-room world loop.
    let (input_tx, input_rx) = mpsc::channel::<RoomEvent>(config::INPUT_CHANNEL_CAPACITY);
    let (users_tx, users_rx) = watch::channel(0usize);

    let room = Room::new(
        GameSettings::default(),
        Tuning::default(),
        config::admin_password(),
        Arc::new(hub),
        input_tx.clone(),
        users_tx,
    );

    // Spawn the authoritative simulation loop.
    tokio::spawn(room_task(room, input_rx, config::TICK_INTERVAL));

    Ok(Arc::new(AppState { input_tx, users_rx }))
}
