use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::OtpRecord;
use super::OtpStore;
use super::SubscriberStore;
use crate::domain::SubscriberEmail;

/// In-process tables. State is lost on restart and is not shared between
/// replicas; fine for development and tests.
///
/// Every method takes the lock once and never holds it across an `.await`.
#[derive(Default)]
pub struct InMemoryStore {
    otps: Mutex<HashMap<SubscriberEmail, OtpRecord>>,
    subscribers: Mutex<HashSet<SubscriberEmail>>,
}

/// A poisoned lock means another request panicked mid-update; surface it as a
/// storage error instead of panicking again.
fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, anyhow::Error> {
    mutex
        .lock()
        .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))
}

#[async_trait]
impl OtpStore for InMemoryStore {
    async fn get(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<OtpRecord>, anyhow::Error> {
        Ok(lock(&self.otps)?.get(email).cloned())
    }

    async fn put(
        &self,
        email: &SubscriberEmail,
        record: &OtpRecord,
    ) -> Result<(), anyhow::Error> {
        lock(&self.otps)?.insert(email.clone(), record.clone());
        Ok(())
    }

    async fn delete(
        &self,
        email: &SubscriberEmail,
        expected: &OtpRecord,
    ) -> Result<bool, anyhow::Error> {
        let mut otps = lock(&self.otps)?;
        match otps.get(email) {
            Some(current) if current.code == expected.code => {
                otps.remove(email);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, anyhow::Error> {
        let mut otps = lock(&self.otps)?;
        let before = otps.len();
        otps.retain(|_, record| !record.is_expired(now));
        Ok((before - otps.len()) as u64)
    }
}

#[async_trait]
impl SubscriberStore for InMemoryStore {
    async fn contains(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error> {
        Ok(lock(&self.subscribers)?.contains(email))
    }

    async fn add(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error> {
        Ok(lock(&self.subscribers)?.insert(email.clone()))
    }

    async fn remove(
        &self,
        email: &SubscriberEmail,
    ) -> Result<bool, anyhow::Error> {
        Ok(lock(&self.subscribers)?.remove(email))
    }

    async fn count(&self) -> Result<u64, anyhow::Error> {
        Ok(lock(&self.subscribers)?.len() as u64)
    }
}
