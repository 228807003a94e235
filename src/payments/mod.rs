//! Payment collaborator seam. The engine consumes two things: invoice
//! creation and a push stream of payment notifications. Both sit behind
//! [`InvoiceGateway`] so the payment-node client proper stays outside this
//! crate; [`simulated::SimulatedGateway`] implements the trait for
//! development and tests.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{error::Result, services::order::OrderEngine};

pub mod simulated;

pub use simulated::SimulatedGateway;

/// A notification from the payment node, de-duplicated downstream by the
/// payment request identifier.
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    pub payment_request: String,
    pub paid: bool,
}

#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    /// Requests an invoice for `value` units with the given memo and expiry.
    /// Returns the payment request identifier.
    async fn create_invoice(&self, value: u64, memo: &str, expiry_secs: u64) -> Result<String>;

    /// Opens the inbound payment event stream. May be called again after the
    /// stream closes; implementations re-arm their transport on each call.
    async fn subscribe(&self) -> Result<mpsc::Receiver<PaymentEvent>>;
}

/// Consumes payment notifications and drives settlement. One long-lived task;
/// each event is an independent unit of work, and a failure settling one
/// order never stops processing for others. When the stream closes the loop
/// re-subscribes after a delay, without duplicating the settlement handler.
pub async fn run_payment_listener(
    engine: Arc<OrderEngine>,
    gateway: Arc<dyn InvoiceGateway>,
    resubscribe_delay: Duration,
) {
    loop {
        let mut events = match gateway.subscribe().await {
            Ok(events) => events,
            Err(error) => {
                tracing::error!(%error, "Failed to subscribe to payment events, retrying");
                tokio::time::sleep(resubscribe_delay).await;
                continue;
            }
        };
        tracing::info!("Payment event stream connected");

        while let Some(event) = events.recv().await {
            if !event.paid {
                tracing::debug!(
                    payment_request = %event.payment_request,
                    "Ignoring unpaid payment event"
                );
                continue;
            }

            if let Err(error) = engine.settle(&event.payment_request).await {
                tracing::error!(
                    %error,
                    payment_request = %event.payment_request,
                    "Failed to process payment"
                );
            }
        }

        tracing::warn!("Payment event stream closed, reconnecting");
        tokio::time::sleep(resubscribe_delay).await;
    }
}
