//! Outgoing messages. Each function renders a subject plus HTML and plain
//! text bodies; sending is left to `EmailClient`.

use htmlescape::encode_minimal;

use crate::domain::OtpCode;
use crate::domain::Quote;
use crate::domain::SubscriberEmail;

pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

const STYLE: &str = "font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #e0e0e0; border-radius: 10px;";

pub fn otp_email(
    code: &OtpCode,
    expiry_minutes: i64,
) -> RenderedEmail {
    let code = code.as_ref();
    RenderedEmail {
        subject: "Your MangaByte verification code".to_string(),
        html: format!(
            r#"<div style="{STYLE}">
  <h1 style="color: #ff6b9e;">Verify your email</h1>
  <p>Your verification code is:</p>
  <p style="font-size: 32px; letter-spacing: 8px; font-weight: bold;">{code}</p>
  <p>This code expires in {expiry_minutes} minutes. If you did not ask to subscribe to MangaByte, ignore this email.</p>
</div>"#
        ),
        text: format!(
            "Your MangaByte verification code is {code}\n\nThis code expires in {expiry_minutes} minutes. If you did not ask to subscribe to MangaByte, ignore this email.\n"
        ),
    }
}

/// `frontend_url?unsubscribe=<email>`; the page pre-fills the unsubscribe form
pub fn unsubscribe_link(
    frontend_url: &str,
    email: &SubscriberEmail,
) -> String {
    format!(
        "{frontend_url}?unsubscribe={}",
        urlencoding::encode(email.as_ref())
    )
}

pub fn welcome_email(
    email: &SubscriberEmail,
    quote: &Quote,
    avatar_url: &str,
    frontend_url: &str,
) -> RenderedEmail {
    let name = email.local_part();
    let unsubscribe_url = unsubscribe_link(frontend_url, email);

    let html_name = encode_minimal(name);
    let html_text = encode_minimal(quote.text);
    let html_character = encode_minimal(quote.character);
    let html_source = encode_minimal(quote.source);
    let html_unsubscribe = encode_minimal(&unsubscribe_url);
    let html_avatar = encode_minimal(avatar_url);

    RenderedEmail {
        subject: format!("Welcome to MangaByte, {name}!"),
        html: format!(
            r#"<div style="{STYLE}">
  <h1 style="color: #ff6b9e;">Welcome to MangaByte, {html_name}!</h1>
  <p>Thank you for subscribing to MangaByte. Here's your daily dose of motivation from the world of manga:</p>
  <blockquote style="background: #f9f9f9; border-left: 5px solid #ff6b9e; margin: 1.5em 10px; padding: 0.5em 10px;">
    <p style="font-style: italic;">"{html_text}"</p>
    <footer style="text-align: right; color: #666;">{html_character}, <cite>{html_source}</cite></footer>
  </blockquote>
  <div style="text-align: center; margin: 20px 0;">
    <img src="{html_avatar}" alt="Your Manga Avatar" style="width: 150px; height: 150px; border-radius: 50%;" />
  </div>
  <p>If you wish to unsubscribe at any time, follow the link below:</p>
  <p><a href="{html_unsubscribe}" style="color: #ff6b9e;">Unsubscribe from MangaByte</a></p>
  <p>Best regards,<br>The MangaByte Team</p>
</div>"#
        ),
        text: format!(
            "Welcome to MangaByte, {name}!\n\nYour daily dose of motivation from the world of manga:\n\n\"{}\"\n  {}, {}\n\nYour Manga Avatar: {avatar_url}\n\nUnsubscribe: {unsubscribe_url}\n",
            quote.text, quote.character, quote.source,
        ),
    }
}

pub fn goodbye_email(
    email: &SubscriberEmail,
    frontend_url: &str,
) -> RenderedEmail {
    let name = email.local_part();
    let html_name = encode_minimal(name);
    let html_frontend = encode_minimal(frontend_url);
    RenderedEmail {
        subject: "Sorry to see you go!".to_string(),
        html: format!(
            r#"<div style="{STYLE}">
  <h1 style="color: #ff6b9e;">We're sad to see you go, {html_name}!</h1>
  <p>You've been unsubscribed from MangaByte.</p>
  <p>If this was a mistake, you can <a href="{html_frontend}" style="color: #ff6b9e;">resubscribe here</a>.</p>
  <p>Best regards,<br>The MangaByte Team</p>
</div>"#
        ),
        text: format!(
            "We're sad to see you go, {name}!\n\nYou've been unsubscribed from MangaByte.\n\nIf this was a mistake, you can resubscribe at any time at {frontend_url}\n\nBest regards,\nThe MangaByte Team\n"
        ),
    }
}
