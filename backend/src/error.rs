use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

/// Failure surfaced to a client. Always rendered as `{success: false, message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}

/// Body for handlers that report failures in-band with a 200 status.
pub fn failure(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": false,
        "message": message.into(),
    }))
}

pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    log::warn!("Rejected malformed JSON body: {}", err);
    ApiError::Validation(format!("Invalid request body: {}", err)).into()
}
