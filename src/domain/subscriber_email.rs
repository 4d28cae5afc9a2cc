use std::fmt::Display;

use validator::ValidateEmail;

/// A parsed email address, used as the key for OTP records and subscribers,
/// and for both senders and recipients of outgoing mail.
///
/// Parsing trims surrounding whitespace and lowercases the address, so
/// `John@Foo.com ` and `john@foo.com` refer to the same subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<Self, String> {
        let normalized = email.trim().to_lowercase();
        ValidateEmail::validate_email(&normalized)
            .then_some(Self(normalized))
            .ok_or(format!("Invalid email: {email:?}"))
    }

    /// The part before `@`, used to greet subscribers by name
    pub fn local_part(&self) -> &str {
        self.0
            .split_once('@')
            .map(|(local, _)| local)
            .unwrap_or(&self.0)
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
