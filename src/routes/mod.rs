mod health_check;
mod home;
mod send_otp;
mod status;
mod unsubscribe;
mod verify_otp;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
pub use health_check::*;
pub use home::*;
pub use send_otp::*;
use serde::Serialize;
pub use status::*;
pub use unsubscribe::*;
pub use verify_otp::*;

/// Body of every failed `/api` response
#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
}

/// `{"success": false, "error": message}` with the given status
fn json_error(
    status: StatusCode,
    message: &str,
) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        success: false,
        error: message,
    })
}

/// Body of successful `/api` responses that only carry a message
#[derive(Serialize)]
struct MessageBody {
    success: bool,
    message: &'static str,
}

impl MessageBody {
    fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
