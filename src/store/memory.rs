use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    store::{NewOrder, Order, PlaceStore, RateLimitRecord, SettledTotals, Settings},
};

/// In-memory store. Orders are keyed by payment request, which doubles as the
/// unique index the settlement path correlates on. All mutating paths take a
/// single lock per collection, so compare-and-set semantics hold without any
/// further coordination.
#[derive(Default)]
pub struct MemoryStore {
    board: RwLock<Option<String>>,
    settings: RwLock<Settings>,
    orders: Mutex<HashMap<String, Order>>,
    rate_limits: Mutex<HashMap<String, RateLimitRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaceStore for MemoryStore {
    async fn load_board(&self) -> Result<Option<String>> {
        Ok(self.board.read().await.clone())
    }

    async fn replace_board(&self, encoded: String) -> Result<()> {
        *self.board.write().await = Some(encoded);
        Ok(())
    }

    async fn settings(&self) -> Result<Settings> {
        Ok(self.settings.read().await.clone())
    }

    async fn put_settings(&self, settings: Settings) -> Result<()> {
        *self.settings.write().await = settings;
        Ok(())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        let mut orders = self.orders.lock().await;
        if orders.contains_key(&order.payment_request) {
            return Err(AppError::Storage(format!(
                "duplicate payment request {}",
                order.payment_request
            )));
        }

        let now = Utc::now();
        let record = Order {
            id: Uuid::new_v4(),
            payment_request: order.payment_request.clone(),
            pixels: order.pixels,
            pixels_count: order.pixels_count,
            settled: false,
            session_id: order.session_id,
            created_at: now,
            updated_at: now,
        };
        orders.insert(order.payment_request, record.clone());
        Ok(record)
    }

    async fn find_order_by_payment_request(&self, payment_request: &str) -> Result<Option<Order>> {
        Ok(self.orders.lock().await.get(payment_request).cloned())
    }

    async fn mark_settled(&self, payment_request: &str) -> Result<bool> {
        let mut orders = self.orders.lock().await;
        let order = orders
            .get_mut(payment_request)
            .ok_or_else(|| AppError::OrderNotFound(payment_request.to_string()))?;

        if order.settled {
            return Ok(false);
        }
        order.settled = true;
        order.updated_at = Utc::now();
        Ok(true)
    }

    async fn remove_unsettled_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut orders = self.orders.lock().await;
        let before = orders.len();
        orders.retain(|_, order| order.settled || order.created_at >= cutoff);
        Ok((before - orders.len()) as u64)
    }

    async fn settled_totals_since(&self, since: DateTime<Utc>) -> Result<SettledTotals> {
        let orders = self.orders.lock().await;
        let mut totals = SettledTotals::default();
        for order in orders.values() {
            if order.settled && order.updated_at > since {
                totals.pixels += u64::from(order.pixels_count);
                totals.orders += 1;
            }
        }
        Ok(totals)
    }

    async fn admit_request(&self, client_key: &str, window: Duration, limit: u32) -> Result<bool> {
        let now = Utc::now();
        let mut records = self.rate_limits.lock().await;

        let Some(record) = records.get_mut(client_key) else {
            records.insert(
                client_key.to_string(),
                RateLimitRecord {
                    client_key: client_key.to_string(),
                    requests: 1,
                    window_start: now,
                },
            );
            return Ok(true);
        };

        let window = chrono::Duration::from_std(window)
            .map_err(|e| AppError::Storage(format!("invalid rate limit window: {e}")))?;

        if now - record.window_start >= window {
            record.requests = 1;
            record.window_start = now;
            return Ok(true);
        }

        if record.requests < limit {
            record.requests += 1;
            return Ok(true);
        }

        Ok(false)
    }
}
