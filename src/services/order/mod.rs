//! The order engine: validation, invoice issuance, exactly-once settlement,
//! and the board merge. All subsystems talk to it through typed calls; the
//! only shared mutable state is the board, and every merge serializes on
//! `merge_lock` across the read → merge → write critical section.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::{
    board::{
        PixelEdit,
        codec::{self, ChannelOrder},
        image,
    },
    config::{COLOR_SWATCH, Config},
    error::{AppError, Result},
    payments::InvoiceGateway,
    store::{NewOrder, PlaceStore},
    ws::types::{OrderSettled, ServerMessage, SettingsPayload, StatsSnapshot},
};

pub mod reaper;
pub mod validation;

const EVENT_BUFFER_SIZE: usize = 256;

pub struct OrderEngine {
    config: Arc<Config>,
    store: Arc<dyn PlaceStore>,
    gateway: Arc<dyn InvoiceGateway>,
    events: broadcast::Sender<ServerMessage>,
    merge_lock: Mutex<()>,
}

impl OrderEngine {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn PlaceStore>,
        gateway: Arc<dyn InvoiceGateway>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            config,
            store,
            gateway,
            events,
            merge_lock: Mutex::new(()),
        }
    }

    /// Subscribes to the broadcast events (`OrderSettled`, `StatsUpdated`).
    pub fn subscribe_events(&self) -> broadcast::Receiver<ServerMessage> {
        self.events.subscribe()
    }

    /// Creates the blank board snapshot if none exists. Runs once at startup;
    /// merges assume the board record is present from then on.
    pub async fn ensure_board(&self) -> Result<()> {
        if self.store.load_board().await?.is_some() {
            return Ok(());
        }

        let length = self.config.board.length;
        tracing::info!(length, "Initializing blank board");
        let encoded = codec::encode(&image::blank_board(length), length, ChannelOrder::Rgba)?;
        self.store.replace_board(encoded).await
    }

    /// Validates an edit set, requests an invoice, persists the pending order
    /// and returns the payment request the client must pay.
    pub async fn submit_order(&self, edits: Vec<PixelEdit>, session_id: Uuid) -> Result<String> {
        let settings = self.store.settings().await?;
        validation::validate_order(&edits, &settings, &self.config.board)?;

        let count = edits.len() as u32;
        let value = u64::from(count) * settings.price_per_pixel;
        let memo = format!("Payment for {count} pixels at lightning.place.");

        let payment_request = self
            .gateway
            .create_invoice(value, &memo, settings.invoice_expiry_secs)
            .await
            .map_err(|error| {
                tracing::error!(%error, "Invoice request failed");
                AppError::InvoiceUnavailable
            })?;

        let length = self.config.board.length;
        let order_image = image::image_from_order(&edits, length);
        let pixels = codec::encode(&order_image, length, ChannelOrder::Rgba)?;

        let order = self
            .store
            .insert_order(NewOrder {
                payment_request: payment_request.clone(),
                pixels,
                pixels_count: count,
                session_id,
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            payment_request = %payment_request,
            pixels = count,
            "Order created, awaiting payment"
        );

        Ok(payment_request)
    }

    /// Handles a "payment received" notification. Idempotent: duplicate
    /// notifications for an already-settled order are a logged no-op, so
    /// redundant listener instances cannot merge an order twice.
    pub async fn settle(&self, payment_request: &str) -> Result<()> {
        tracing::info!(payment_request, "Payment received");

        let order = self
            .store
            .find_order_by_payment_request(payment_request)
            .await?
            .ok_or_else(|| AppError::OrderNotFound(payment_request.to_string()))?;

        if order.settled {
            tracing::info!(payment_request, "Skipping payment, order already settled");
            return Ok(());
        }

        // Compare-and-set; a concurrent duplicate loses here and no-ops.
        if !self.store.mark_settled(payment_request).await? {
            tracing::info!(payment_request, "Order settled concurrently, skipping");
            return Ok(());
        }

        let image = match self.merge_into_board(&order.pixels).await {
            Ok(image) => image,
            Err(error) => {
                // The order is now settled but the board was not updated.
                // Accepted risk: surfaced for manual reconciliation, never
                // auto-corrected.
                tracing::error!(
                    %error,
                    payment_request,
                    "CRITICAL: order settled but board merge failed"
                );
                return Err(error);
            }
        };

        tracing::info!(payment_request, "Order settled");
        let _ = self.events.send(ServerMessage::OrderSettled(OrderSettled {
            image: codec::png_data_uri(&image),
            payment_request: payment_request.to_string(),
            session_id: order.session_id,
            pixels_painted_count: order.pixels_count,
        }));

        Ok(())
    }

    /// Read board → merge → write board, serialized across settlements.
    /// Returns the new encoded board.
    async fn merge_into_board(&self, order_pixels: &str) -> Result<String> {
        let _guard = self.merge_lock.lock().await;

        let encoded_board = self.store.load_board().await?.ok_or(AppError::BoardMissing)?;
        let mut board = codec::decode(&encoded_board, ChannelOrder::Rgba)?;
        let order = codec::decode(order_pixels, ChannelOrder::Rgba)?;

        if order.len() != board.len() {
            return Err(AppError::MalformedImage(format!(
                "order image has {} channel bytes, board has {}",
                order.len(),
                board.len()
            )));
        }

        image::merge_order(&order, &mut board);

        let encoded = codec::encode(&board, self.config.board.length, ChannelOrder::Rgba)?;
        self.store.replace_board(encoded.clone()).await?;
        Ok(encoded)
    }

    /// The current board snapshot as a data URI.
    pub async fn latest_board(&self) -> Result<String> {
        let encoded = self.store.load_board().await?.ok_or(AppError::BoardMissing)?;
        Ok(codec::png_data_uri(&encoded))
    }

    /// Stored settings with the static board config attached.
    pub async fn settings_payload(&self) -> Result<SettingsPayload> {
        let settings = self.store.settings().await?;
        Ok(SettingsPayload {
            price_per_pixel: settings.price_per_pixel,
            invoice_expiry: settings.invoice_expiry_secs,
            order_pixels_limit: settings.order_pixels_limit,
            colors: COLOR_SWATCH.iter().map(|c| c.to_string()).collect(),
            board_length: self.config.board.length,
        })
    }

    /// Recomputes the trailing-24h totals over settled orders.
    pub async fn stats_snapshot(&self) -> Result<StatsSnapshot> {
        let since = chrono::Utc::now() - chrono::Duration::seconds(86_400);
        let totals = self.store.settled_totals_since(since).await?;
        Ok(StatsSnapshot {
            pixels_per_day: totals.pixels,
            transactions_per_day: totals.orders,
        })
    }

    /// Broadcasts the current stats snapshot, zero-valued when there is no
    /// data, so subscribers always have a well-defined current value.
    pub async fn broadcast_stats(&self) -> Result<()> {
        let snapshot = self.stats_snapshot().await?;
        let _ = self.events.send(ServerMessage::StatsUpdated(snapshot));
        Ok(())
    }

    /// Removes orders that stayed unpaid past twice the invoice expiry.
    pub async fn remove_unsettled_orders(&self) -> Result<u64> {
        let settings = self.store.settings().await?;
        let cutoff =
            chrono::Utc::now() - chrono::Duration::seconds(2 * settings.invoice_expiry_secs as i64);

        let removed = self.store.remove_unsettled_before(cutoff).await?;
        tracing::info!(removed, "Cleaned unsettled orders");
        Ok(removed)
    }
}
