use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::entities::session::AccessToken;

/// Reads the caller's `Authorization: <type> <token>` header into an
/// [`AccessToken`] request extension. The token is not verified here; the
/// remote API does that on every call it is forwarded to.
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
            // Public routes still get the token when one is sent.
            if let Some(token) = extract_token(&req) {
                req.extensions_mut().insert(token);
                return service.call(req).await;
            }

            if is_public_route(req.path(), req.method().as_str()) {
                return service.call(req).await;
            }

            tracing::warn!(path = %req.path(), "Missing or malformed Authorization header");
            Ok(custom_error_response(req, HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Missing or invalid credentials"
            }))))
        })
    }
}

fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    if method != "GET" {
        return false;
    }

    if matches!(path, "/" | "/health" | "/api/v1/listings" | "/api/v1/trips/density") {
        return true;
    }

    if path.starts_with("/api/v1/previews/") {
        return true;
    }

    // Listing detail is public; a user's own listings are not.
    path.strip_prefix("/api/v1/listings/")
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn extract_token(req: &ServiceRequest) -> Option<AccessToken> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(AccessToken::from_header)
}

fn custom_error_response(req: ServiceRequest, res: HttpResponse) -> ServiceResponse<BoxBody> {
    req.into_response(res)
}
