use sha2::Digest;
use sha2::Sha256;

use super::SubscriberEmail;

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/8.x/avataaars/svg";

/// DiceBear avatar for a subscriber. The seed is derived from the (normalized)
/// email, so the same subscriber always gets the same face.
pub fn avatar_url(email: &SubscriberEmail) -> String {
    let seed = hex::encode(Sha256::digest(email.as_ref().as_bytes()));
    format!("{AVATAR_BASE_URL}?seed={seed}&radius=50")
}
