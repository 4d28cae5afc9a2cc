use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Serialize;

use super::json_error;
use crate::domain::top_sources;
use crate::store::Stores;
use crate::utils::error_chain_fmt;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    status: &'static str,
    subscribers: u64,
    top_manga_titles: Vec<&'static str>,
}

#[derive(thiserror::Error)]
pub enum StatusError {
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for StatusError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for StatusError {
    fn status_code(&self) -> StatusCode { StatusCode::INTERNAL_SERVER_ERROR }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), "Failed to fetch status")
    }
}

/// `GET /api/status`
///
/// Subscriber count and the five most quoted titles
#[tracing::instrument(name = "Reporting status", skip(stores))]
pub async fn status(stores: web::Data<Stores>) -> Result<HttpResponse, StatusError> {
    let subscribers = stores.subscribers.count().await?;
    Ok(HttpResponse::Ok().json(Status {
        status: "active",
        subscribers,
        top_manga_titles: top_sources(5),
    }))
}
