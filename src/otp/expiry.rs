// expired codes are also dropped lazily by `verify`, but abandoned ones
// (issued and never submitted) would otherwise pile up in the store. this
// worker is solely responsible for periodically pruning them.

use std::time::Duration;

use chrono::Utc;

use super::OtpVerifier;

async fn expire_codes_loop(
    verifier: &OtpVerifier,
    interval: Duration,
) -> Result<(), anyhow::Error> {
    loop {
        match verifier.purge_expired(Utc::now()).await {
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "failed to purge expired verification codes"
                );
                tokio::time::sleep(Duration::from_secs(60)).await
            }
            Ok(n) => {
                if n > 0 {
                    tracing::info!(purged = n, "purged expired verification codes");
                }
                tokio::time::sleep(interval).await
            }
        }
    }
}

/// To be run as a separate task, next to the main API. Must share the API's
/// `OtpVerifier`, since the in-memory store lives inside it.
pub async fn init_expiry_worker(
    verifier: OtpVerifier,
    interval: Duration,
) -> Result<(), anyhow::Error> {
    expire_codes_loop(&verifier, interval).await
}
