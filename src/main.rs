use std::{net::SocketAddr, sync::Arc};

use lightning_place::{
    AppState, build_router,
    config::Config,
    error::Result,
    middleware::rate_limit::RateLimiter,
    payments::{self, InvoiceGateway, SimulatedGateway},
    services::{order::OrderEngine, order::reaper, stats},
    store::{MemoryStore, PlaceStore},
    utils::server::{init_tracing, shutdown_signal},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    config.validate()?;
    tracing::info!("Configuration loaded");

    let store: Arc<dyn PlaceStore> = Arc::new(MemoryStore::new());
    tracing::info!("Store initialized");

    if !config.payments.simulate {
        tracing::warn!(
            "No payment node configured; falling back to the simulated gateway. \
             Set SIMULATE_PAYMENTS=yes to silence this warning."
        );
    }
    let gateway: Arc<dyn InvoiceGateway> =
        Arc::new(SimulatedGateway::new(config.payments.simulate_delay));

    let config = Arc::new(config);
    let engine = Arc::new(OrderEngine::new(
        config.clone(),
        store.clone(),
        gateway.clone(),
    ));

    engine.ensure_board().await?;
    tracing::info!("Board initialized");

    tokio::spawn(payments::run_payment_listener(
        engine.clone(),
        gateway,
        config.payments.resubscribe_delay,
    ));
    tracing::info!("Payment listener started");

    tokio::spawn(reaper::run_reaper(
        engine.clone(),
        config.tasks.reaper_interval,
    ));
    tracing::info!("Started interval to clear unsettled orders");

    tokio::spawn(stats::run_stats(
        engine.clone(),
        config.tasks.stats_interval,
    ));
    tracing::info!("Started interval to update stats");

    let limiter = Arc::new(RateLimiter::new(
        store,
        &config.server,
        config.rate_limit.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        engine,
        limiter,
    };

    let app = build_router(state);

    let server_addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    tracing::info!("Server shutdown complete");

    Ok(())
}
