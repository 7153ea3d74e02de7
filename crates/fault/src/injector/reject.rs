//! Reject injector

use axum::extract::Request;
use futures::future::{self, FutureExt};

use super::{InjectFuture, Next};
use crate::error::FaultError;

/// Ends the request without writing any status or body
///
/// The request is failed with [`FaultError::Rejected`]. A hyper connection
/// serving the middleware aborts on that error, which a client observes as an
/// empty reply rather than a well-formed response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectInjector;

impl RejectInjector {
    /// Create a reject injector
    pub const fn new() -> Self {
        Self
    }

    pub(crate) fn apply(self, _request: Request, _next: Next) -> InjectFuture {
        future::ready(Err(FaultError::Rejected.into())).boxed()
    }
}
