use actix_web::{
    error::{InternalError, JsonPayloadError, QueryPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};

pub fn json_error(status: StatusCode, error: &str, details: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "error": error,
        "details": details
    }))
}

/// Malformed query strings (e.g. `categorie=abc`) become a structured 400
/// instead of ever falling through as an unfiltered listing.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = json_error(
        StatusCode::BAD_REQUEST,
        "Invalid query parameters",
        &err.to_string(),
    );
    InternalError::from_response(err, response).into()
}

pub fn json_body_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = json_error(
        StatusCode::BAD_REQUEST,
        "Invalid JSON body",
        &err.to_string(),
    );
    InternalError::from_response(err, response).into()
}
