use crate::error::AppError;
use crate::models::AuthUser;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    /// Readable without a token, but only with GET.
    public_reads: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/checkout-deal",
                "/create-checkout-session",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/v1/auth/", "/webhook/"],
            public_reads: vec!["/api/v1/deals"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }
        // the deal listing and single deals, not their codes
        *method == Method::GET
            && self.public_reads.iter().any(|&base| {
                path == base
                    || path.strip_prefix(base).and_then(|rest| rest.strip_prefix('/')).is_some_and(
                        |id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()),
                    )
            })
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let auth_header = req.headers().get("Authorization");

        let token = if let Some(auth_value) = auth_header {
            if let Ok(auth_str) = auth_value.to_str() {
                auth_str.strip_prefix("Bearer ")
            } else {
                None
            }
        } else {
            None
        };

        if let Some(token) = token {
            let user = self
                .jwt_service
                .verify_access_token(token)
                .ok()
                .and_then(|claims| {
                    Some(AuthUser {
                        user_id: claims.sub.parse().ok()?,
                        role: claims.role,
                    })
                });
            match user {
                Some(user) => {
                    req.extensions_mut().insert(user);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                None => {
                    let error = AppError::AuthError("Invalid access token".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            }
        } else {
            let error = AppError::AuthError("Missing access token".to_string());
            Box::pin(async move { Err(error.into()) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::POST, "/checkout-deal"));
        assert!(paths.is_public(&Method::POST, "/create-checkout-session"));
        assert!(paths.is_public(&Method::POST, "/webhook/stripe"));
        assert!(paths.is_public(&Method::POST, "/api/v1/auth/login"));
        assert!(paths.is_public(&Method::GET, "/api/v1/deals"));
        assert!(paths.is_public(&Method::GET, "/api/v1/deals/12"));
    }

    #[test]
    fn test_protected_paths() {
        let paths = PublicPaths::new();
        assert!(!paths.is_public(&Method::POST, "/api/v1/deals"));
        assert!(!paths.is_public(&Method::DELETE, "/api/v1/deals/12"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/deals/12/codes"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/salon/deals"));
        assert!(!paths.is_public(&Method::POST, "/create-admin"));
    }
}
