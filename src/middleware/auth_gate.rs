/// Authentication gate.
///
/// Validates the access-token cookie on protected routes and injects the
/// authenticated identity into request extensions. Every failure is
/// terminal for the request; an expired token answers 401 and the client
/// recovers through the refresh endpoint.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{AccessClaims, TokenCodec, ACCESS_TOKEN_COOKIE};
use crate::error::{AppError, AuthError};

/// The identity injected for downstream handlers, read through
/// `web::ReqData<CurrentUser>`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Middleware guarding routes that require an authenticated session.
pub struct AuthGate {
    codec: TokenCodec,
}

impl AuthGate {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            codec: self.codec.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    codec: TokenCodec,
}

impl<S> AuthGateService<S> {
    fn reject<B>(err: AppError) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>
    where
        B: 'static,
    {
        Box::pin(async move { Err(err.into()) })
    }
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match req.cookie(ACCESS_TOKEN_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => {
                tracing::warn!(path = %req.path(), "Missing access token cookie");
                return Self::reject(AppError::Auth(AuthError::Unauthorized));
            }
        };

        let claims = match self.codec.parse::<AccessClaims>(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Access token rejected");
                return Self::reject(AppError::Token(e));
            }
        };

        let user_id = match claims.user_id() {
            Ok(id) => id,
            Err(e) => return Self::reject(AppError::Token(e)),
        };

        req.extensions_mut().insert(CurrentUser { id: user_id });
        tracing::debug!(user_id = %user_id, "Access token validated");

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
