use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Deserialize;
use serde::Serialize;

use super::json_error;
use crate::domain::avatar_url;
use crate::domain::random_quote;
use crate::domain::OtpCode;
use crate::domain::Quote;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::emails::welcome_email;
use crate::otp::OtpError;
use crate::otp::OtpVerifier;
use crate::startup::FrontendUrl;
use crate::utils::error_chain_fmt;

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    email: String,
    otp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpResponse {
    success: bool,
    message: &'static str,
    quote: Quote,
    avatar_url: String,
}

#[derive(thiserror::Error)]
pub enum VerifyOtpError {
    #[error("{0}")]
    ValidationError(String),
    /// Missing, expired or wrong code; the message is shown to the user
    #[error(transparent)]
    RejectedCode(OtpError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for VerifyOtpError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<OtpError> for VerifyOtpError {
    fn from(e: OtpError) -> Self {
        match e {
            OtpError::NotFound | OtpError::Expired | OtpError::Mismatch => Self::RejectedCode(e),
            OtpError::UnexpectedError(e) => Self::UnexpectedError(e),
            // verification never sends mail, but don't lose the cause if it does
            e @ OtpError::DeliveryFailure(_) => Self::UnexpectedError(anyhow::Error::new(e)),
        }
    }
}

impl ResponseError for VerifyOtpError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::RejectedCode(_) => StatusCode::BAD_REQUEST,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::UnexpectedError(_) => json_error(self.status_code(), "Failed to verify code"),
            _ => json_error(self.status_code(), &self.to_string()),
        }
    }
}

/// Send the welcome email. The subscription already happened, so a failure
/// here is logged rather than returned.
#[tracing::instrument(name = "Sending welcome email", skip_all)]
async fn send_welcome_email(
    email_client: &EmailClient,
    email: &SubscriberEmail,
    quote: &Quote,
    avatar_url: &str,
    frontend_url: &str,
) {
    let message = welcome_email(email, quote, avatar_url, frontend_url);
    if let Err(e) = email_client
        .send_email(email, &message.subject, &message.html, &message.text)
        .await
    {
        tracing::warn!(
            error.cause_chain = ?e,
            error.message = %e,
            "failed to send welcome email"
        );
    }
}

/// `POST /api/verify-otp`
///
/// Check the submitted code. On success the email becomes a subscriber, a
/// welcome email (random quote + avatar) is sent to new subscribers, and the
/// same quote and avatar are returned to the page.
///
/// # Request example
///
/// ```sh
///     curl --json '{"email": "john@foo.com", "otp": "123456"}' http://127.0.0.1:8000/api/verify-otp
/// ```
#[tracing::instrument(
    name = "Verifying subscriber email",
    skip(body, verifier, email_client, frontend_url),
    fields(subscriber_email = %body.email)
)]
pub async fn verify_otp(
    body: web::Json<VerifyOtpRequest>,
    verifier: web::Data<OtpVerifier>,
    email_client: web::Data<EmailClient>,
    frontend_url: web::Data<FrontendUrl>,
) -> Result<HttpResponse, VerifyOtpError> {
    let VerifyOtpRequest { email, otp } = body.into_inner();
    let email = SubscriberEmail::parse(email)
        .map_err(|_| VerifyOtpError::ValidationError("Please enter a valid email".to_string()))?;
    let code = OtpCode::parse(otp).map_err(VerifyOtpError::ValidationError)?;

    let verified = verifier.verify(&email, &code).await?;

    let quote = random_quote();
    let avatar = avatar_url(&email);

    let message = match verified.is_new_subscriber {
        true => {
            send_welcome_email(&email_client, &email, &quote, &avatar, &frontend_url.0).await;
            "Email verified successfully"
        }
        false => "Email already verified",
    };

    Ok(HttpResponse::Ok().json(VerifyOtpResponse {
        success: true,
        message,
        quote,
        avatar_url: avatar,
    }))
}
