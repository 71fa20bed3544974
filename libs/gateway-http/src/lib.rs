mod http;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;

use replay_engine::ReplayCoordinator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) coordinator: Arc<ReplayCoordinator>,
}

/// Broker gateway HTTP server.
///
/// Routes are the gateway's public surface: keyword/offset queries,
/// produce, replay, and partition prediction for a key.
pub async fn run(
    port: u16,
    coordinator: Arc<ReplayCoordinator>,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let state = AppState { coordinator };

    let app = Router::new()
        .route("/msg", post(http::handle_query_msg))
        .route("/produce_msg", post(http::handle_produce_msg))
        .route("/produce_query_msg", post(http::handle_produce_query_msg))
        .route(
            "/msg/replay",
            get(http::handle_replay_get).post(http::handle_replay_post),
        )
        .route("/msg/offset", get(http::handle_query_by_offset))
        .route("/msg/produce", post(http::handle_produce_from_json))
        .route("/msg/partition", get(http::handle_partition_for_key))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;
    tracing::info!(port, "gateway api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}
