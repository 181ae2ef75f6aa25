use actix_web::{error::ResponseError, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::user::LoginRequest, errors::AuthError, AppState};

/// Admin session login. The status code alone distinguishes the three
/// outcomes: 200 staff login, 403 valid credentials without staff
/// privilege, 401 invalid credentials.
#[instrument(skip(state, credentials))]
pub async fn admin_login(
    state: web::Data<AppState>,
    credentials: web::Json<LoginRequest>,
) -> impl Responder {
    match state.auth_handler.admin_login(credentials.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(AuthError::Forbidden(message)) => HttpResponse::Forbidden().json(serde_json::json!({
            "success": false,
            "message": message
        })),
        Err(AuthError::WrongCredentials) => HttpResponse::Unauthorized().json(serde_json::json!({
            "success": false,
            "message": "Invalid credentials"
        })),
        Err(e) => e.error_response(),
    }
}
