use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::PixelEdit;

/// Messages a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    NewOrder { pixels: Vec<PixelEdit> },
    GetLatestBoard,
    GetSettings,
    Ping,
}

/// Messages the server sends. `OrderSettled` and `StatsUpdated` are broadcast
/// to every connected socket; the rest go only to the requesting socket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    OrderResult(OrderResult),
    LatestBoard { data: String },
    SettingsResult(SettingsPayload),
    Error { error: String },
    Pong,
    OrderSettled(OrderSettled),
    StatsUpdated(StatsSnapshot),
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_request: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderResult {
    pub fn ok(payment_request: String) -> Self {
        Self {
            payment_request: Some(payment_request),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            payment_request: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSettled {
    /// Data URI of the full updated board image.
    pub image: String,
    pub payment_request: String,
    pub session_id: Uuid,
    pub pixels_painted_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsPayload {
    pub price_per_pixel: u64,
    pub invoice_expiry: u64,
    pub order_pixels_limit: u32,
    pub colors: Vec<String>,
    pub board_length: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatsSnapshot {
    pub pixels_per_day: u64,
    pub transactions_per_day: u64,
}
