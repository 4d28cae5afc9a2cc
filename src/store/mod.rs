//! Storage seams for OTP records and subscribers.
//!
//! Verification logic only sees the `OtpStore` / `SubscriberStore` traits, so
//! the backing implementation (an in-process table or Postgres) is picked by
//! configuration without touching `otp`.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
pub use memory::InMemoryStore;
pub use postgres::get_connection_pool;
pub use postgres::PgStore;

use crate::configuration::Settings;
use crate::configuration::StoreBackend;
use crate::domain::OtpCode;
use crate::domain::SubscriberEmail;

/// The single pending code for an email. Replaced wholesale on reissue,
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired(
        &self,
        now: DateTime<Utc>,
    ) -> bool {
        now > self.expires_at
    }
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn get(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<OtpRecord>, anyhow::Error>;

    /// Insert, overwriting any existing record for `email`
    async fn put(
        &self,
        email: &SubscriberEmail,
        record: &OtpRecord,
    ) -> Result<(), anyhow::Error>;

    /// Compare-and-delete: remove the record for `email` only if its code is
    /// still `expected.code`. Returns whether a record was removed.
    async fn delete(
        &self,
        email: &SubscriberEmail,
        expected: &OtpRecord,
    ) -> Result<bool, anyhow::Error>;

    /// Drop every record that expired before `now`. Returns how many.
    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, anyhow::Error>;
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn contains(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error>;

    /// Returns `true` only if `email` was not already subscribed
    async fn add(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error>;

    /// Returns `true` only if `email` was subscribed
    async fn remove(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error>;

    async fn count(&self) -> Result<u64, anyhow::Error>;
}

/// Both stores, as shared trait objects
#[derive(Clone)]
pub struct Stores {
    pub otps: Arc<dyn OtpStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::default());
        Self {
            otps: store.clone(),
            subscribers: store,
        }
    }
}

/// Build the backend selected by `store.backend`. The postgres backend runs
/// the embedded migrations first.
pub async fn build_stores(cfg: &Settings) -> Result<Stores, anyhow::Error> {
    let stores = match cfg.store.backend {
        StoreBackend::Memory => Stores::in_memory(),
        StoreBackend::Postgres => {
            let store = Arc::new(PgStore::connect(&cfg.database).await?);
            Stores {
                otps: store.clone(),
                subscribers: store,
            }
        }
    };
    tracing::info!(backend = ?cfg.store.backend, "store ready");
    Ok(stores)
}
