use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use broker_api::MessageBroker;
use broker_tcp::TcpBrokerClient;
use replay_engine::ReplayCoordinator;

use crate::config::{ServeArgs, ServerConfig};
use crate::error::ServerError;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("gateway-server starting");

    // --- Load config ---
    let config = ServerConfig::load(&args.config)?;
    tracing::info!(config = %args.config, "loaded config");

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- Broker binding ---
    let broker_addr = config.broker_addr();
    let broker: Arc<dyn MessageBroker> = Arc::new(TcpBrokerClient::new(broker_addr.clone()));
    tracing::info!(broker = %broker_addr, "using tcp broker binding");

    let coordinator = Arc::new(ReplayCoordinator::new(broker));

    // --- API server ---
    let mut api = tokio::spawn(gateway_http::run(
        config.api_port,
        coordinator,
        token.clone(),
    ));

    tokio::select! {
        res = &mut api => {
            token.cancel();
            return flatten(res);
        }
        sig = tokio::signal::ctrl_c() => {
            sig?;
            tracing::info!("shutdown signal received");
            token.cancel();
        }
    }

    flatten(api.await)
}

fn flatten(
    res: Result<Result<(), String>, tokio::task::JoinError>,
) -> Result<(), ServerError> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ServerError::Api(e)),
        Err(e) => Err(ServerError::Api(e.to_string())),
    }
}
