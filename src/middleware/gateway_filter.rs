/// Gateway authentication filter.
///
/// Composed in front of a gateway's routes: every inbound request outside
/// the public allow-list must carry a bearer credential that the auth
/// service confirms via its validateToken operation. Missing header,
/// invalid token, timeout, and network failure all collapse to one fixed
/// unauthenticated envelope; no internal error detail crosses the gateway
/// boundary.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::clients::ValidationClient;
use crate::response::ApiResponse;

/// Ordered list of public path prefixes, each matched as
/// `api_prefix + pattern`. An empty prefix makes every path protected:
/// a misconfigured gateway locks down rather than opening up.
#[derive(Clone)]
pub struct PublicPaths {
    api_prefix: String,
    patterns: Vec<String>,
}

impl PublicPaths {
    pub fn new(api_prefix: impl Into<String>, patterns: Vec<String>) -> Self {
        Self {
            api_prefix: api_prefix.into(),
            patterns,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        if self.api_prefix.trim().is_empty() {
            return false;
        }
        self.patterns
            .iter()
            .any(|pattern| path.starts_with(&format!("{}{}", self.api_prefix, pattern)))
    }
}

pub struct GatewayAuthFilter {
    public_paths: PublicPaths,
    client: ValidationClient,
}

impl GatewayAuthFilter {
    pub fn new(public_paths: PublicPaths, client: ValidationClient) -> Self {
        Self {
            public_paths,
            client,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GatewayAuthFilter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = GatewayAuthFilterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(GatewayAuthFilterService {
            service: Rc::new(service),
            public_paths: self.public_paths.clone(),
            client: self.client.clone(),
        }))
    }
}

pub struct GatewayAuthFilterService<S> {
    service: Rc<S>,
    public_paths: PublicPaths,
    client: ValidationClient,
}

fn unauthenticated() -> Error {
    let response =
        HttpResponse::Unauthorized().json(ApiResponse::error(401, "Unauthenticated"));
    actix_web::error::InternalError::from_response("Unauthenticated", response).into()
}

impl<S, B> Service<ServiceRequest> for GatewayAuthFilterService<S>
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
        let service = self.service.clone();

        if self.public_paths.is_public(req.path()) {
            return Box::pin(async move { service.call(req).await });
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string());

        let client = self.client.clone();

        Box::pin(async move {
            let token = match token {
                Some(token) => token,
                None => {
                    tracing::warn!("Missing bearer credential at gateway");
                    return Err(unauthenticated());
                }
            };

            match client.validate(&token).await {
                Ok(true) => service.call(req).await,
                Ok(false) => {
                    tracing::warn!("Token rejected by auth service");
                    Err(unauthenticated())
                }
                Err(e) => {
                    // Fail closed: a validation outage never lets traffic through
                    tracing::error!(error = %e, "Token validation call failed");
                    Err(unauthenticated())
                }
            }
        })
    }
}
