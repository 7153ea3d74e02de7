//! Error injector

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use futures::future::{self, FutureExt};

use super::{InjectFuture, Next};
use crate::error::ConfigError;

/// Responds with a configured status code and its standard reason text
///
/// The status code must have a standard meaning. An invalid code makes the
/// injector inert: requests pass through to the next handler.
#[derive(Debug, Clone, Copy)]
pub struct ErrorInjector {
    status: Option<StatusCode>,
}

impl ErrorInjector {
    /// Create an error injector, falling back to inert on an invalid code
    pub fn new(status_code: u16) -> Self {
        Self::try_new(status_code).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Error injector disabled");
            Self::inert()
        })
    }

    /// Create an error injector, rejecting codes without a standard meaning
    pub fn try_new(status_code: u16) -> Result<Self, ConfigError> {
        StatusCode::from_u16(status_code)
            .ok()
            .filter(|status| status.canonical_reason().is_some())
            .map(|status| Self {
                status: Some(status),
            })
            .ok_or(ConfigError::InvalidStatusCode(status_code))
    }

    /// An error injector that always passes through
    pub const fn inert() -> Self {
        Self { status: None }
    }

    /// Whether the injector passes every request through
    pub const fn is_inert(&self) -> bool {
        self.status.is_none()
    }

    /// Configured status code, if valid
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub(crate) fn apply(self, request: Request, next: Next) -> InjectFuture {
        match self.status {
            Some(status) => future::ready(Ok(error_response(status))).boxed(),
            None => next.run(request),
        }
    }
}

/// Plain text response carrying the reason phrase, newline terminated
fn error_response(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or_default();
    let mut response = Response::new(Body::from(format!("{reason}\n")));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
