use actix_web::{FromRequest, HttpRequest, HttpMessage};
use futures_util::future::{ready, Ready};
use crate::{entities::session::AccessToken, errors::AppError};

/// Extractor for the caller's access token, placed in the request by the
/// auth middleware.
/// Returns 401 if the request carried no usable Authorization header.
/// Usage: Add `token: AuthToken` as a parameter to your handler function.
#[derive(Debug)]
pub struct AuthToken(pub AccessToken);

impl FromRequest for AuthToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AccessToken>() {
            Some(token) => ready(Ok(AuthToken(token.clone()))),
            None => ready(Err(AppError::UnauthorizedAccess.into())),
        }
    }
}

/// Like [`AuthToken`] but for routes that also serve anonymous callers.
#[derive(Debug)]
pub struct MaybeAuthToken(pub Option<AccessToken>);

impl FromRequest for MaybeAuthToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeAuthToken(req.extensions().get::<AccessToken>().cloned())))
    }
}
