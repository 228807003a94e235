use std::{sync::Arc, time::Duration};

use crate::services::order::OrderEngine;

/// Background sweep for abandoned orders: runs once at startup and then on a
/// fixed interval, deleting orders that stayed unpaid past twice the invoice
/// expiry. Failures are logged and the next sweep runs regardless.
pub async fn run_reaper(engine: Arc<OrderEngine>, interval: Duration) {
    tracing::info!("Running clear unsettled orders once at startup");
    sweep(&engine).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately and was handled above

    loop {
        ticker.tick().await;
        sweep(&engine).await;
    }
}

async fn sweep(engine: &OrderEngine) {
    if let Err(error) = engine.remove_unsettled_orders().await {
        tracing::error!(%error, "Failed to clean unsettled orders");
    }
}
