pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod services;
pub mod store;
pub mod utils;
pub mod ws;

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config, middleware::rate_limit::RateLimiter, services::order::OrderEngine,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<OrderEngine>,
    pub limiter: Arc<RateLimiter>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .server
                .cors_allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", api::router())
        .nest("/ws", ws::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::logging::make_log_span)
                .on_request(())
                .on_eos(()),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(
            state.config.server.max_concurrent_requests,
        ))
        .with_state(state)
}
