//! Slow injector
//!
//! Delays a request before handing it on. The wait races the request's
//! [`RequestCancellation`] token, so a cancelled request ends with
//! [`FaultError::Cancelled`] instead of reaching the next handler.

use std::time::Duration;

use axum::extract::Request;
use chrono::TimeDelta;
use futures::future::FutureExt;
use tokio_util::sync::CancellationToken;

use super::{InjectFuture, Next};
use crate::error::{ConfigError, FaultError};

/// Cancellation signal of a single request, carried in request extensions
#[derive(Debug, Clone, Default)]
pub struct RequestCancellation(pub CancellationToken);

impl RequestCancellation {
    /// Create a new, uncancelled signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal derived from a parent token (e.g. a server shutdown token)
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self(parent.child_token())
    }

    /// Underlying token
    pub const fn token(&self) -> &CancellationToken {
        &self.0
    }

    /// Cancel the request
    pub fn cancel(&self) {
        self.0.cancel();
    }
}

/// Waits a fixed delay, then continues with the request unchanged
#[derive(Debug, Clone, Copy)]
pub struct SlowInjector {
    delay: Option<Duration>,
}

impl SlowInjector {
    /// Create a slow injector for a non-negative delay
    pub const fn new(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }

    /// Create a slow injector from a signed delay, inert if negative
    pub fn from_delta(delay: TimeDelta) -> Self {
        Self::try_from_delta(delay).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Slow injector disabled");
            Self::inert()
        })
    }

    /// Create a slow injector from a signed delay, rejecting negative values
    pub fn try_from_delta(delay: TimeDelta) -> Result<Self, ConfigError> {
        delay
            .to_std()
            .map(Self::new)
            .map_err(|_| ConfigError::NegativeDelay(delay))
    }

    /// A slow injector that always passes through
    pub const fn inert() -> Self {
        Self { delay: None }
    }

    /// Whether the injector passes every request through
    pub const fn is_inert(&self) -> bool {
        self.delay.is_none()
    }

    /// Configured delay, if valid
    pub const fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub(crate) fn apply(self, request: Request, next: Next) -> InjectFuture {
        let Some(delay) = self.delay else {
            return next.run(request);
        };
        let cancellation = request.extensions().get::<RequestCancellation>().cloned();

        async move {
            match cancellation {
                Some(RequestCancellation(token)) => {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => {
                            tracing::debug!(?delay, "Request cancelled during injected delay");
                            return Err(FaultError::Cancelled.into());
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                },
                None => tokio::time::sleep(delay).await,
            }
            next.run(request).await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Instant,
    };

    use axum::http::StatusCode;

    use super::*;
    use crate::injector::testing::{counting_next, request};

    #[test]
    fn negative_delta_is_inert() {
        let delta = TimeDelta::milliseconds(-1);
        assert_eq!(
            SlowInjector::try_from_delta(delta).unwrap_err(),
            ConfigError::NegativeDelay(delta)
        );
        assert!(SlowInjector::from_delta(delta).is_inert());
    }

    #[test]
    fn zero_and_positive_deltas_are_valid() {
        let zero = SlowInjector::try_from_delta(TimeDelta::zero()).unwrap();
        assert_eq!(zero.delay(), Some(Duration::ZERO));

        let slow = SlowInjector::from_delta(TimeDelta::milliseconds(250));
        assert_eq!(slow.delay(), Some(Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn waits_before_calling_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();
        let response = SlowInjector::new(Duration::from_millis(30))
            .apply(request("/"), counting_next(&calls))
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn inert_does_not_wait() {
        let calls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();
        SlowInjector::inert()
            .apply(request("/"), counting_next(&calls))
            .await
            .unwrap();

        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_aborts_wait_and_skips_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancellation = RequestCancellation::new();
        let mut req = request("/");
        req.extensions_mut().insert(cancellation.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancellation.cancel();
        });

        let start = Instant::now();
        let err = SlowInjector::new(Duration::from_secs(10))
            .apply(req, counting_next(&calls))
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert_eq!(FaultError::from_boxed(&err), Some(FaultError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn already_cancelled_request_never_reaches_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();
        let mut req = request("/");
        req.extensions_mut()
            .insert(RequestCancellation::child_of(&shutdown));
        shutdown.cancel();

        let err = SlowInjector::new(Duration::ZERO)
            .apply(req, counting_next(&calls))
            .await
            .unwrap_err();

        assert_eq!(FaultError::from_boxed(&err), Some(FaultError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn uncancelled_token_still_continues() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut req = request("/");
        req.extensions_mut().insert(RequestCancellation::new());

        SlowInjector::new(Duration::from_millis(5))
            .apply(req, counting_next(&calls))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
