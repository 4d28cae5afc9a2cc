use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Liveness probe; always an empty 200, independent of the store backend.
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
