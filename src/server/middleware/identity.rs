//! Identity middleware
//!
//! Resolves the bearer token into an [`Identity`] and stores it in the
//! request extensions. It never rejects a request: a missing or invalid
//! token just leaves the request anonymous, and the guards deny it.

use crate::auth::Identity;
use crate::auth::identity::bearer_token;
use crate::server::AppState;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpMessage, HttpRequest, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// Identity of the current request, if a valid token was presented
pub fn request_identity(req: &HttpRequest) -> Option<Identity> {
    req.extensions().get::<Identity>().cloned()
}

/// Identity middleware for Actix-web
pub struct IdentityMiddleware;

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = IdentityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService { service }))
    }
}

/// Service implementation for identity middleware
pub struct IdentityMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);

        if let (Some(token), Some(state)) = (token, req.app_data::<web::Data<AppState>>()) {
            match state.auth.identify(Some(&token)) {
                Some(identity) => {
                    debug!(user_id = %identity.user_id, "Request identity resolved");
                    req.extensions_mut().insert(identity);
                }
                None => debug!("Bearer token rejected, continuing anonymously"),
            }
        }

        Box::pin(self.service.call(req))
    }
}
