use std::sync::Arc;

use fleet_commission::api;
use fleet_commission::config::Config;
use fleet_commission::engine::worker::run_commission_engine;
use fleet_commission::error::AppError;
use fleet_commission::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    tracing::info!(
        revenue_field = %config.commission.revenue_field,
        lookback_days = config.commission.lookback_days,
        min_commission = config.commission.min_commission,
        max_commission = config.commission.max_commission,
        "commission config loaded"
    );

    let (app_state, trip_rx) = AppState::new(
        config.commission.clone(),
        config.trip_queue_size,
        config.event_buffer_size,
    );
    let shared_state = Arc::new(app_state);

    let app = api::rest::router(shared_state.clone());

    tokio::spawn(run_commission_engine(shared_state.clone(), trip_rx));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
