//! Tool server for the arena bridge
//!
//! Exposes the green/blue agent tools over HTTP: `POST /tools/{name}` to
//! invoke, `GET /tools` for discovery, plus the agent card and a health
//! check. Configuration comes from `ARENA_*` environment variables.

mod card;
mod invocations;
mod routes;
mod state;
mod tools;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tool_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("Using data directory: {:?}", config.data_dir);

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::tools::router())
        .merge(routes::card::router())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Tool server listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
