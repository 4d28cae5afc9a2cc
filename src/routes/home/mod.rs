use actix_web::http::header::ContentType;
use actix_web::HttpResponse;

/// `GET /`
///
/// The subscribe page: email form, code form, and (when opened with
/// `?unsubscribe=<email>`) the unsubscribe form. It talks to `/api/*` with
/// `fetch`.
pub async fn home() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        // path relative to this file (checked at compile time!)
        .body(include_str!("./home.html"))
}
