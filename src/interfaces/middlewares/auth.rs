use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};
use uuid::Uuid;

use crate::{entities::token::Claims, errors::AuthError, policy::Principal, AppState};

/// Resolves the request principal exactly once, at the boundary.
///
/// No token → `Anonymous`; a valid bearer token → `User`; a malformed or
/// expired token is rejected immediately. Authorization itself is left to
/// the per-controller policy rules.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let principal = match extract_token(&req) {
                None => Principal::Anonymous,
                Some(token) => {
                    let state = req.app_data::<web::Data<AppState>>()
                        .ok_or_else(|| {
                            tracing::error!("AppState missing in middleware");
                            AuthError::MissingJwtService
                        })?;

                    match state.auth_handler.token_service.decode_jwt(&token) {
                        Ok(decoded) => match principal_from_claims(&decoded.claims) {
                            Some(principal) => principal,
                            None => {
                                tracing::warn!("Token carries an invalid subject");
                                return Ok(custom_error_response(req, HttpResponse::Unauthorized().json(serde_json::json!({
                                    "error": "Invalid token"
                                }))));
                            }
                        },
                        Err(AuthError::TokenExpired) => {
                            return Ok(custom_error_response(req, HttpResponse::Unauthorized().json(serde_json::json!({
                                "error": "Token has expired"
                            }))));
                        }
                        Err(e) => {
                            tracing::warn!("Failed to decode JWT: {}", e);
                            return Ok(custom_error_response(req, HttpResponse::Unauthorized().json(serde_json::json!({
                                "error": "Invalid token"
                            }))));
                        }
                    }
                }
            };

            req.extensions_mut().insert(principal);
            service.call(req).await
        })
    }
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn principal_from_claims(claims: &Claims) -> Option<Principal> {
    let id = Uuid::parse_str(&claims.sub).ok()?;
    Some(Principal::User {
        id,
        username: claims.username.clone(),
        is_staff: claims.staff,
    })
}

fn custom_error_response(req: ServiceRequest, res: HttpResponse) -> ServiceResponse<BoxBody> {
    req.into_response(res)
}
