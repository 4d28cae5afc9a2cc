use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Deserialize;

use super::json_error;
use super::MessageBody;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::emails::goodbye_email;
use crate::startup::FrontendUrl;
use crate::store::Stores;
use crate::utils::error_chain_fmt;

#[derive(Deserialize)]
pub struct UnsubscribeRequest {
    email: String,
}

#[derive(thiserror::Error)]
pub enum UnsubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Email is not subscribed")]
    NotSubscribed,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for UnsubscribeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for UnsubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NotSubscribed => StatusCode::NOT_FOUND,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::UnexpectedError(_) => {
                json_error(self.status_code(), "Failed to process unsubscription")
            }
            _ => json_error(self.status_code(), &self.to_string()),
        }
    }
}

/// `POST /api/unsubscribe`
///
/// Remove `email` from the subscriber set and send a goodbye email. A failed
/// goodbye email is logged; the unsubscription stands.
#[tracing::instrument(
    name = "Removing subscriber",
    skip(body, stores, email_client, frontend_url),
    fields(subscriber_email = %body.email)
)]
pub async fn unsubscribe(
    body: web::Json<UnsubscribeRequest>,
    stores: web::Data<Stores>,
    email_client: web::Data<EmailClient>,
    frontend_url: web::Data<FrontendUrl>,
) -> Result<HttpResponse, UnsubscribeError> {
    let email = SubscriberEmail::parse(body.into_inner().email)
        .map_err(|_| UnsubscribeError::ValidationError("Please enter a valid email".to_string()))?;

    if !stores.subscribers.remove(&email).await? {
        return Err(UnsubscribeError::NotSubscribed);
    }

    let message = goodbye_email(&email, &frontend_url.0);
    if let Err(e) = email_client
        .send_email(&email, &message.subject, &message.html, &message.text)
        .await
    {
        tracing::warn!(
            error.cause_chain = ?e,
            error.message = %e,
            "failed to send goodbye email"
        );
    }

    Ok(HttpResponse::Ok().json(MessageBody::ok("Successfully unsubscribed")))
}
