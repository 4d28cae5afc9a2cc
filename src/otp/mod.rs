//! One-time code issuance and verification.
//!
//! An email has at most one pending code. `issue` replaces it and mails the
//! new code; `verify` checks a submitted code and, on success, consumes the
//! record and subscribes the email. Expired records are dropped lazily by
//! `verify`, and periodically by the sweep in `expiry`.

mod expiry;

use std::fmt::Debug;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
pub use expiry::init_expiry_worker;

use crate::domain::OtpCode;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::emails::otp_email;
use crate::store::OtpRecord;
use crate::store::Stores;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum OtpError {
    #[error("No verification code found for this email")]
    NotFound,
    #[error("Verification code has expired")]
    Expired,
    /// Wrong code; the pending record is kept so the user can retry
    #[error("Invalid verification code")]
    Mismatch,
    /// The email API rejected or dropped the message. Not retried; the caller
    /// must request a fresh code.
    #[error("Failed to send verification code")]
    DeliveryFailure(#[source] reqwest::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for OtpError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    /// `false` if the email was already in the subscriber set
    pub is_new_subscriber: bool,
}

#[derive(Clone)]
pub struct OtpVerifier {
    stores: Stores,
    expiry: Duration,
}

impl OtpVerifier {
    pub fn new(
        stores: Stores,
        expiry: Duration,
    ) -> Self {
        Self { stores, expiry }
    }

    /// Generate a new code for `email` (replacing any pending one) and mail it.
    ///
    /// If delivery fails, the record written by this call is removed again.
    #[tracing::instrument(
        name = "Issuing verification code",
        skip(self, email, email_client),
        fields(subscriber_email = %email)
    )]
    pub async fn issue(
        &self,
        email: &SubscriberEmail,
        email_client: &EmailClient,
    ) -> Result<(), OtpError> {
        let record = self.store_new_code(email, Utc::now()).await?;
        let message = otp_email(&record.code, self.expiry.num_minutes());

        if let Err(e) = email_client
            .send_email(email, &message.subject, &message.html, &message.text)
            .await
        {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "failed to deliver verification code"
            );
            if let Err(cleanup) = self.stores.otps.delete(email, &record).await {
                // left to expire
                tracing::warn!(
                    error.cause_chain = ?cleanup,
                    error.message = %cleanup,
                    "failed to remove undelivered verification code"
                );
            }
            return Err(OtpError::DeliveryFailure(e));
        }
        Ok(())
    }

    async fn store_new_code(
        &self,
        email: &SubscriberEmail,
        now: DateTime<Utc>,
    ) -> Result<OtpRecord, anyhow::Error> {
        let record = OtpRecord {
            code: OtpCode::generate(),
            expires_at: now + self.expiry,
        };
        self.stores.otps.put(email, &record).await?;
        Ok(record)
    }

    /// Check `code` against the pending record for `email`. A match consumes
    /// the record and adds `email` to the subscriber set.
    #[tracing::instrument(
        name = "Verifying code",
        skip(self, email, code),
        fields(subscriber_email = %email)
    )]
    pub async fn verify(
        &self,
        email: &SubscriberEmail,
        code: &OtpCode,
    ) -> Result<Verified, OtpError> {
        self.verify_at(email, code, Utc::now()).await
    }

    async fn verify_at(
        &self,
        email: &SubscriberEmail,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<Verified, OtpError> {
        let record = self
            .stores
            .otps
            .get(email)
            .await?
            .ok_or(OtpError::NotFound)?;

        if record.is_expired(now) {
            self.stores.otps.delete(email, &record).await?;
            return Err(OtpError::Expired);
        }

        if record.code != *code {
            return Err(OtpError::Mismatch);
        }

        // the record can change between `get` and here: either another request
        // consumed it, or a reissue replaced the code
        if !self.stores.otps.delete(email, &record).await? {
            return Err(match self.stores.otps.get(email).await? {
                None => OtpError::NotFound,
                Some(_) => OtpError::Mismatch,
            });
        }

        let is_new_subscriber = self.stores.subscribers.add(email).await?;
        Ok(Verified { is_new_subscriber })
    }

    /// Drop all records that expired before `now`
    pub async fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, anyhow::Error> {
        self.stores.otps.delete_expired(now).await
    }
}
