use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use tokio::sync::{Mutex, mpsc};

use crate::{
    error::Result,
    payments::{InvoiceGateway, PaymentEvent},
};

/// Gateway that issues random payment requests and auto-pays them after a
/// short delay, so the whole order pipeline runs without a payment node.
pub struct SimulatedGateway {
    settle_delay: Duration,
    events: Mutex<Option<mpsc::Sender<PaymentEvent>>>,
}

impl SimulatedGateway {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            events: Mutex::new(None),
        }
    }
}

#[async_trait]
impl InvoiceGateway for SimulatedGateway {
    async fn create_invoice(&self, value: u64, memo: &str, expiry_secs: u64) -> Result<String> {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        let payment_request = format!("sim{suffix}");

        tracing::info!(
            payment_request = %payment_request,
            value,
            expiry_secs,
            memo,
            "Simulated invoice created"
        );

        if let Some(sender) = self.events.lock().await.clone() {
            let delay = self.settle_delay;
            let simulated = payment_request.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = sender
                    .send(PaymentEvent {
                        payment_request: simulated,
                        paid: true,
                    })
                    .await;
            });
        }

        Ok(payment_request)
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<PaymentEvent>> {
        let (sender, receiver) = mpsc::channel(64);
        *self.events.lock().await = Some(sender);
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pays_issued_invoices_after_the_delay() {
        let gateway = SimulatedGateway::new(Duration::from_millis(10));
        let mut events = gateway.subscribe().await.unwrap();

        let payment_request = gateway.create_invoice(5, "test", 600).await.unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.payment_request, payment_request);
        assert!(event.paid);
    }

    #[tokio::test]
    async fn issues_unique_payment_requests() {
        let gateway = SimulatedGateway::new(Duration::from_secs(60));
        let first = gateway.create_invoice(1, "a", 600).await.unwrap();
        let second = gateway.create_invoice(1, "b", 600).await.unwrap();
        assert_ne!(first, second);
    }
}
