//! Request cancellation middleware
//!
//! Attaches a [`RequestCancellation`] to every request, derived from the
//! server's shutdown token. Cancelling the shutdown token cancels all
//! in-flight requests, which aborts pending injected delays.

use std::task::{Context, Poll};

use axum::http::Request;
use fault::RequestCancellation;
use tokio_util::sync::CancellationToken;
use tower::{Layer, Service};

/// Layer that attaches a per-request cancellation signal
#[derive(Debug, Clone)]
pub struct RequestCancellationLayer {
    parent: CancellationToken,
}

impl RequestCancellationLayer {
    /// Create a layer whose request signals are children of `parent`
    #[must_use]
    pub const fn new(parent: CancellationToken) -> Self {
        Self { parent }
    }
}

impl<S> Layer<S> for RequestCancellationLayer {
    type Service = RequestCancellationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestCancellationService {
            inner,
            parent: self.parent.clone(),
        }
    }
}

/// Service inserting a [`RequestCancellation`] into request extensions
#[derive(Debug, Clone)]
pub struct RequestCancellationService<S> {
    inner: S,
    parent: CancellationToken,
}

impl<S, B> Service<Request<B>> for RequestCancellationService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        request
            .extensions_mut()
            .insert(RequestCancellation::child_of(&self.parent));
        self.inner.call(request)
    }
}
