//! Tower middleware for fault injection
//!
//! [`FaultLayer`] wraps a downstream service so that each request first goes
//! through [`Fault::handle`]. The wrapped service reports rejected and
//! cancelled requests as errors; a hyper connection aborts on them without
//! writing a response.

use std::task::{Context, Poll};

use axum::{extract::Request, response::Response};
use tower::{Layer, Service};

use crate::{
    error::BoxError,
    fault::Fault,
    injector::{InjectFuture, Next},
};

/// Layer that applies a [`Fault`] to every request
#[derive(Debug, Clone, Default)]
pub struct FaultLayer {
    fault: Fault,
}

impl FaultLayer {
    /// Create a fault layer
    pub const fn new(fault: Fault) -> Self {
        Self { fault }
    }

    /// Fault applied by this layer
    pub const fn fault(&self) -> &Fault {
        &self.fault
    }
}

impl From<Fault> for FaultLayer {
    fn from(fault: Fault) -> Self {
        Self::new(fault)
    }
}

impl<S> Layer<S> for FaultLayer {
    type Service = FaultService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FaultService {
            inner,
            fault: self.fault.clone(),
        }
    }
}

/// Middleware service evaluating a [`Fault`] before the inner service
#[derive(Debug, Clone)]
pub struct FaultService<S> {
    inner: S,
    fault: Fault,
}

impl<S> FaultService<S> {
    /// Wrap `inner` with `fault`
    pub const fn new(inner: S, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

impl<S> Service<Request> for FaultService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    type Response = Response;
    type Error = BoxError;
    type Future = InjectFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // The readied service goes to the continuation; keep a fresh clone
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        self.fault.handle(request, Next::from_ready_service(inner))
    }
}
