mod avatar;
mod otp_code;
mod quote;
mod subscriber_email;
// allow external `use` statements to skip `subscriber_email` etc
pub use avatar::avatar_url;
pub use otp_code::OtpCode;
pub use quote::random_quote;
pub use quote::top_sources;
pub use quote::Quote;
pub use quote::QUOTES;
pub use subscriber_email::SubscriberEmail;
