use crate::core::AppError;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

/// The caller's active company, established once per request.
///
/// Every repository read is still filtered by an explicit company id at the
/// call site; this only identifies which company the caller is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyId(pub i64);

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromRequest for CompanyId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let company_id = req.extensions().get::<CompanyId>().copied();

        ready(company_id.ok_or_else(|| {
            Error::from(AppError::unauthorized("Missing company context"))
        }))
    }
}

/// Tenant context middleware
///
/// Requires an `X-Company-Id` header on every request except the public
/// endpoints and stores the parsed `CompanyId` in request extensions for
/// the handlers' extractor.
pub struct TenantContext;

impl<S, B> Transform<S, ServiceRequest> for TenantContext
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TenantContextMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TenantContextMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct TenantContextMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TenantContextMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        Box::pin(async move {
            // Skip tenant resolution for health check and public endpoints
            let path = req.path();
            if path == "/health" || path == "/" {
                return svc.call(req).await;
            }

            let company_id = req
                .headers()
                .get("X-Company-Id")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| Error::from(AppError::unauthorized("Missing X-Company-Id header")))?
                .parse::<i64>()
                .map_err(|_| Error::from(AppError::unauthorized("Invalid X-Company-Id header")))?;

            if company_id <= 0 {
                return Err(Error::from(AppError::unauthorized(
                    "Invalid X-Company-Id header",
                )));
            }

            tracing::debug!(company_id = company_id, path = %req.path(), "Resolved tenant context");

            req.extensions_mut().insert(CompanyId(company_id));

            svc.call(req).await
        })
    }
}
