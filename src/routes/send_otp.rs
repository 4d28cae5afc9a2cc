use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Deserialize;
use serde::Serialize;

use super::json_error;
use super::MessageBody;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::otp::OtpError;
use crate::otp::OtpVerifier;
use crate::store::Stores;
use crate::utils::error_chain_fmt;

#[derive(Deserialize)]
pub struct SendOtpRequest {
    email: String,
}

/// Reply for an email that is already subscribed; no code is sent
#[derive(Serialize)]
struct AlreadyVerified {
    success: bool,
    message: &'static str,
    verified: bool,
}

#[derive(thiserror::Error)]
pub enum SendOtpError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to send verification code")]
    DeliveryError(#[source] OtpError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for SendOtpError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<OtpError> for SendOtpError {
    fn from(e: OtpError) -> Self {
        match e {
            OtpError::UnexpectedError(e) => Self::UnexpectedError(e),
            e => Self::DeliveryError(e),
        }
    }
}

impl ResponseError for SendOtpError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::ValidationError(msg) => json_error(self.status_code(), msg),
            // internals stay in the logs
            _ => json_error(self.status_code(), "Failed to send verification code"),
        }
    }
}

/// `POST /api/send-otp`
///
/// Issue a verification code for `email` and mail it. Emails that are
/// already subscribed short-circuit with `verified: true` and no code is
/// issued.
///
/// # Request example
///
/// ```sh
///     curl --json '{"email": "john@foo.com"}' http://127.0.0.1:8000/api/send-otp
/// ```
#[tracing::instrument(
    name = "Sending verification code",
    skip(body, verifier, stores, email_client),
    fields(subscriber_email = %body.email)
)]
pub async fn send_otp(
    body: web::Json<SendOtpRequest>,
    verifier: web::Data<OtpVerifier>,
    stores: web::Data<Stores>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SendOtpError> {
    let email = SubscriberEmail::parse(body.into_inner().email)
        .map_err(|_| SendOtpError::ValidationError("Please enter a valid email".to_string()))?;

    if stores.subscribers.contains(&email).await? {
        tracing::info!("email already verified, no code issued");
        return Ok(HttpResponse::Ok().json(AlreadyVerified {
            success: true,
            message: "Email already verified",
            verified: true,
        }));
    }

    verifier.issue(&email, &email_client).await?;

    Ok(HttpResponse::Ok().json(MessageBody::ok("Verification code sent to your email")))
}
