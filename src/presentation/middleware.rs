use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::domain::user::AuthenticatedUser;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderName, HeaderValue},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

type LocalBoxFuture<T> = Pin<Box<dyn std::future::Future<Output = T>>>;

/// Why a request carries no identity; surfaced by the `AuthenticatedUser` extractor.
#[derive(Clone, Debug)]
pub struct AuthRejection(pub String);

/// Tags each request with a UUID and logs its outcome and latency.
///
/// Sets the `x-request-id` and `x-response-time` response headers.
pub struct RequestTracing;

impl<S, B> Transform<S, ServiceRequest> for RequestTracing
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTracingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTracingService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestTracingService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTracingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = Uuid::new_v4().to_string();
        let method = req.method().clone();
        let path = req.path().to_string();
        let span = info_span!("request", request_id = %request_id);

        let fut = span.in_scope(|| self.service.call(req));

        Box::pin(
            async move {
                let mut res = fut.await?;
                let duration_ms = start.elapsed().as_millis();

                let headers = res.headers_mut();
                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    headers.insert(HeaderName::from_static("x-request-id"), value);
                }
                if let Ok(value) = HeaderValue::from_str(&format!("{duration_ms}ms")) {
                    headers.insert(HeaderName::from_static("x-response-time"), value);
                }

                info!(
                    method = %method,
                    path = %path,
                    status = res.status().as_u16(),
                    duration_ms = duration_ms,
                    "Request processed"
                );
                Ok(res)
            }
            .instrument(span),
        )
    }
}

/// Resolves the bearer token of every request to a user.
///
/// Requests are never rejected here: the resolved `AuthenticatedUser` (or the
/// `AuthRejection` reason) is stored in the request extensions and protected
/// handlers opt in by extracting `AuthenticatedUser`.
pub struct JwtAuthMiddleware {
    auth_service: Arc<AuthService>,
}

impl JwtAuthMiddleware {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self { auth_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            auth_service: self.auth_service.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    auth_service: Arc<AuthService>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let auth_service = self.auth_service.clone();
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            match auth_service.authorize(header.as_deref()).await {
                Ok(user) => {
                    debug!(user_id = user.user_id, "Request authenticated");
                    req.extensions_mut().insert::<AuthenticatedUser>(user);
                }
                Err(DomainError::Unauthorized(reason)) => {
                    req.extensions_mut().insert(AuthRejection(reason));
                }
                Err(e) => {
                    req.extensions_mut().insert(AuthRejection(e.to_string()));
                }
            }
            service.call(req).await
        })
    }
}
