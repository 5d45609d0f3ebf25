use axum::{routing::get, Router};
use clap::Parser;
use config::{ServerConfig, ServerError};
use game_manager::AppState;
use record::{BackgroundSink, JsonLinesSink};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use ws::ws_handler;

mod config;
mod game_manager;
mod record;
mod ws;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let engine_config = Arc::new(config.load_engine_config()?);
    let file_sink = Arc::new(JsonLinesSink::new(&config.records));
    tracing::info!(records = %file_sink.path().display(), tick_ms = config.tick_ms, "Configuration loaded");
    let sink = Arc::new(BackgroundSink::spawn(file_sink));

    let state = Arc::new(AppState::new(engine_config, sink, config.tick_interval()));
    state.clone().spawn_cleanup_task();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("listening on {}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
