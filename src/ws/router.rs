use axum::{Router, routing::get};

use crate::{AppState, ws::handler::ws_handler};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(ws_handler))
}
