use actix_web::{FromRequest, HttpRequest, HttpMessage};
use futures_util::future::{ready, Ready};

use crate::domain::policy::Principal;

/// Extractor for the request-scoped principal resolved by the auth
/// middleware. Infallible: requests without (or before) the middleware
/// resolve to `Anonymous`.
/// Usage: add `principal: Principal` as a parameter to a handler function.
impl FromRequest for Principal {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let principal = req
            .extensions()
            .get::<Principal>()
            .cloned()
            .unwrap_or(Principal::Anonymous);
        ready(Ok(principal))
    }
}
