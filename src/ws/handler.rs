//! Thin socket layer: deserializes typed client messages, runs admission,
//! calls the engine and forwards broadcasts. All application logic stays in
//! the engine; an error handling one message never ends the connection loop.

use std::net::SocketAddr;

use axum::{
    extract::{
        ConnectInfo, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::{
    AppState,
    ws::types::{ClientMessage, OrderResult, ServerMessage},
};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

async fn handle_socket(socket: WebSocket, state: AppState, addr: SocketAddr) {
    let session_id = Uuid::new_v4();
    let client_key = addr.ip().to_string();
    tracing::info!(%session_id, %client_key, "Client connected");

    let mut events = state.engine.subscribe_events();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            // Inbound client messages
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_message(&state, &text, session_id, &client_key).await;
                        match serde_json::to_string(&reply) {
                            Ok(json) => {
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(error) => {
                                tracing::error!(%error, "Failed to serialize reply");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(error)) => {
                        tracing::error!(%error, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }

            // Broadcasts (settlements, stats)
            update = events.recv() => {
                match update {
                    Ok(update) => {
                        match serde_json::to_string(&update) {
                            Ok(json) => {
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(error) => {
                                tracing::error!(%error, "Failed to serialize broadcast");
                            }
                        }
                    }
                    Err(RecvError::Lagged(count)) => {
                        tracing::warn!(%session_id, count, "Client lagged broadcasts");
                    }
                    Err(_) => break,
                }
            }
        }
    }

    tracing::info!(%session_id, "Client disconnected");
}

async fn handle_message(
    state: &AppState,
    text: &str,
    session_id: Uuid,
    client_key: &str,
) -> ServerMessage {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(error) => {
            tracing::debug!(%error, "Unparseable client message");
            return ServerMessage::Error {
                error: "Invalid request".into(),
            };
        }
    };

    if matches!(message, ClientMessage::Ping) {
        return ServerMessage::Pong;
    }

    // Admission runs per message, maintenance ahead of the rate limit.
    if let Err(denied) = state.limiter.admit(client_key).await {
        let error = denied.client_message();
        return match message {
            ClientMessage::NewOrder { .. } => ServerMessage::OrderResult(OrderResult::err(error)),
            _ => ServerMessage::Error { error },
        };
    }

    match message {
        ClientMessage::NewOrder { pixels } => {
            ServerMessage::OrderResult(match state.engine.submit_order(pixels, session_id).await {
                Ok(payment_request) => OrderResult::ok(payment_request),
                Err(error) => OrderResult::err(error.client_message()),
            })
        }
        ClientMessage::GetLatestBoard => match state.engine.latest_board().await {
            Ok(data) => ServerMessage::LatestBoard { data },
            Err(error) => ServerMessage::Error {
                error: error.client_message(),
            },
        },
        ClientMessage::GetSettings => match state.engine.settings_payload().await {
            Ok(settings) => ServerMessage::SettingsResult(settings),
            Err(error) => ServerMessage::Error {
                error: error.client_message(),
            },
        },
        ClientMessage::Ping => ServerMessage::Pong,
    }
}
