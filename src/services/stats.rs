use std::{sync::Arc, time::Duration};

use crate::services::order::OrderEngine;

/// Rolling-stats task: on a fixed cadence, recompute the trailing-24h totals
/// over settled orders and broadcast them to every subscriber. The snapshot
/// is emitted unconditionally, zero-valued when there is no data.
pub async fn run_stats(engine: Arc<OrderEngine>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        if let Err(error) = engine.broadcast_stats().await {
            tracing::error!(%error, "Failed to update stats");
        }
    }
}
