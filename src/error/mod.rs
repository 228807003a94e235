use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request")]
    EmptyOrder,

    #[error("Array too large")]
    OversizedOrder,

    #[error("Maximum amount of pixels to be painted per order is {0}")]
    OrderOverLimit(u32),

    #[error("Missing coordinates")]
    MissingCoordinates,

    #[error("Missing or invalid color {0}")]
    InvalidColor(String),

    #[error("Color not in swatch {0}")]
    ColorNotInSwatch(String),

    #[error("Coordinates out of bounds")]
    CoordinatesOutOfBounds,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Application undergoing maintenance, please try again later.")]
    Maintenance,

    #[error("Could not create an invoice, please try again later.")]
    InvoiceUnavailable,

    #[error("No order found for payment request {0}")]
    OrderNotFound(String),

    #[error("Board not initialized")]
    BoardMissing,

    #[error("Image decode error - {0}")]
    ImageDecode(#[from] png::DecodingError),

    #[error("Image encode error - {0}")]
    ImageEncode(#[from] png::EncodingError),

    #[error("Malformed image - {0}")]
    MalformedImage(String),

    #[error("Base64 decode error - {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Serialization error - {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error - {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid params - {0}")]
    InvalidParams(String),

    #[error("Storage error - {0}")]
    Storage(String),

    #[error("TryInitError - {0}")]
    TryInit(#[from] tracing_subscriber::util::TryInitError),
}

impl AppError {
    /// True for errors caused by the submitting client's own input; these are
    /// reported back verbatim and never logged above debug level.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyOrder
                | Self::OversizedOrder
                | Self::OrderOverLimit(_)
                | Self::MissingCoordinates
                | Self::InvalidColor(_)
                | Self::ColorNotInSwatch(_)
                | Self::CoordinatesOutOfBounds
                | Self::RateLimitExceeded
                | Self::Maintenance
        )
    }

    /// The message sent to the client. User and admission errors pass through
    /// as-is; everything else is logged here and masked.
    pub fn client_message(&self) -> String {
        match self {
            Self::InvoiceUnavailable => self.to_string(),
            err if err.is_user_error() => err.to_string(),
            err => {
                tracing::error!(error = %err, "Internal error");
                "Something went wrong, please try again later.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Maintenance => StatusCode::SERVICE_UNAVAILABLE,
            Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            err if err.is_user_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": self.client_message() }).to_string();

        (status, [("content-type", "application/json")], body).into_response()
    }
}
