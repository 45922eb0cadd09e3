/// In-process JWT guard for the service's own protected routes.
///
/// Runs the full validity check (signature, expiry, revocation set,
/// password-change watermark) and injects the verified claims into request
/// extensions for route handlers.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::rc::Rc;

use crate::response::ApiResponse;
use crate::store::{credentials, revocation};
use crate::token::{TokenCodec, TokenKind};

pub struct JwtGuard {
    codec: TokenCodec,
    pool: PgPool,
}

impl JwtGuard {
    pub fn new(codec: TokenCodec, pool: PgPool) -> Self {
        Self { codec, pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtGuardService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            pool: self.pool.clone(),
        }))
    }
}

pub struct JwtGuardService<S> {
    service: Rc<S>,
    codec: TokenCodec,
    pool: PgPool,
}

fn unauthenticated(reason: &str) -> Error {
    tracing::warn!(reason, "Rejecting request as unauthenticated");
    let response =
        HttpResponse::Unauthorized().json(ApiResponse::error(401, "Unauthenticated"));
    actix_web::error::InternalError::from_response("Unauthenticated", response).into()
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

impl<S, B> Service<ServiceRequest> for JwtGuardService<S>
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
        let codec = self.codec.clone();
        let pool = self.pool.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let token = match bearer_token(&req) {
                Some(token) => token,
                None => return Err(unauthenticated("missing or malformed bearer header")),
            };

            let claims = codec
                .verify(&token, TokenKind::Access)
                .map_err(|_| unauthenticated("token verification failed"))?;

            if revocation::contains(&pool, &claims.jti)
                .await
                .map_err(|_| unauthenticated("revocation lookup failed"))?
            {
                return Err(unauthenticated("token revoked"));
            }

            let user_id = claims
                .user_id()
                .map_err(|_| unauthenticated("subject is not a user id"))?;
            let user = credentials::find_by_id(&pool, user_id)
                .await
                .map_err(|_| unauthenticated("credential lookup failed"))?
                .filter(|u| u.is_active)
                .ok_or_else(|| unauthenticated("unknown or inactive account"))?;

            if claims.iat < user.password_changed_at.timestamp() {
                return Err(unauthenticated("token predates password change"));
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
