//! Storage seam. The engine only ever talks to [`PlaceStore`]; the bundled
//! [`memory::MemoryStore`] backs the binary and the tests, and a persistent
//! document store plugs in behind the same trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;

pub mod memory;

pub use memory::MemoryStore;

/// Process-wide tunables, read from the store at every touchpoint rather than
/// cached, so an operator can change them without a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub price_per_pixel: u64,
    pub invoice_expiry_secs: u64,
    pub order_pixels_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            price_per_pixel: 1,
            invoice_expiry_secs: 600,
            order_pixels_limit: 250_000,
        }
    }
}

/// A batch of edits pending or completed payment-gated commit.
///
/// `payment_request` is the sole correlation key between the payment
/// collaborator's notifications and this record, and is unique per order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub payment_request: String,
    /// Base64 PNG of the order's edit image (transparent except painted cells).
    pub pixels: String,
    pub pixels_count: u32,
    pub settled: bool,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub payment_request: String,
    pub pixels: String,
    pub pixels_count: u32,
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettledTotals {
    pub pixels: u64,
    pub orders: u64,
}

#[derive(Debug, Clone)]
pub struct RateLimitRecord {
    pub client_key: String,
    pub requests: u32,
    pub window_start: DateTime<Utc>,
}

#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// The encoded board snapshot, if one has been initialized.
    async fn load_board(&self) -> Result<Option<String>>;

    /// Replaces the board snapshot in one durable write.
    async fn replace_board(&self, encoded: String) -> Result<()>;

    async fn settings(&self) -> Result<Settings>;

    async fn put_settings(&self, settings: Settings) -> Result<()>;

    async fn insert_order(&self, order: NewOrder) -> Result<Order>;

    async fn find_order_by_payment_request(&self, payment_request: &str) -> Result<Option<Order>>;

    /// Compare-and-set of the settled flag: flips `settled` false → true and
    /// bumps `updated_at`. Returns `false` when the order was already settled,
    /// which is how concurrent duplicate notifications lose the race.
    async fn mark_settled(&self, payment_request: &str) -> Result<bool>;

    /// Removes unsettled orders created before `cutoff`. Returns the count.
    async fn remove_unsettled_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Totals over orders settled at or after `since`.
    async fn settled_totals_since(&self, since: DateTime<Utc>) -> Result<SettledTotals>;

    /// Windowed admission for one client key: lazily creates the
    /// record, resets it when the window has elapsed, increments while under
    /// `limit`. The read-modify-write is atomic per key. Returns whether the
    /// request is admitted.
    async fn admit_request(&self, client_key: &str, window: Duration, limit: u32) -> Result<bool>;
}
