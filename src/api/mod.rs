//! Read-only HTTP surface for clients that only need a snapshot: the current
//! board image and the live settings. Everything mutating goes over the
//! socket.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::{AppState, error::Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/board", get(latest_board))
        .route("/settings", get(settings))
}

async fn latest_board(State(state): State<AppState>) -> Result<Json<Value>> {
    let data = state.engine.latest_board().await?;
    Ok(Json(json!({ "data": data })))
}

async fn settings(State(state): State<AppState>) -> Result<Json<Value>> {
    let payload = state.engine.settings_payload().await?;
    Ok(Json(serde_json::to_value(payload)?))
}
