//! Fault injectors
//!
//! An injector decides what happens to a request once a [`Fault`] fires. It
//! receives the request together with the [`Next`] continuation and fully
//! controls whether and how the continuation runs.
//!
//! The built-in injectors form a closed set ([`Injector`]); anything else
//! plugs in through [`CustomInjector`].
//!
//! [`Fault`]: crate::Fault

mod chain;
mod error;
mod reject;
mod slow;

use std::{fmt, future::Future, sync::Arc};

use async_trait::async_trait;
use axum::{extract::Request, response::Response};
use futures::future::{BoxFuture, FutureExt};
use tower::{Service, ServiceExt};

pub use chain::ChainInjector;
pub use error::ErrorInjector;
pub use reject::RejectInjector;
pub use slow::{RequestCancellation, SlowInjector};

use crate::error::BoxError;

/// Future returned by injectors and continuations
pub type InjectFuture = BoxFuture<'static, Result<Response, BoxError>>;

/// One-shot continuation carrying a request to the rest of the pipeline
pub struct Next {
    run: Box<dyn FnOnce(Request) -> InjectFuture + Send>,
}

impl Next {
    /// Wrap a closure as a continuation
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Request) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Response, BoxError>> + Send + 'static,
    {
        Self {
            run: Box::new(move |request| f(request).boxed()),
        }
    }

    /// Continuation that hands the request to a tower service
    pub fn from_service<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response> + Send + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send,
    {
        Self::new(move |request| async move {
            service
                .oneshot(request)
                .await
                .map_err(Into::<BoxError>::into)
        })
    }

    /// Continuation that calls a service already driven to readiness
    ///
    /// The service is called only if the continuation runs; dropping the
    /// continuation drops the service along with whatever it reserved in
    /// `poll_ready`.
    pub fn from_ready_service<S>(mut service: S) -> Self
    where
        S: Service<Request, Response = Response> + Send + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send,
    {
        Self::new(move |request| {
            let response = service.call(request);
            async move { response.await.map_err(Into::<BoxError>::into) }
        })
    }

    /// Invoke the continuation
    pub fn run(self, request: Request) -> InjectFuture {
        (self.run)(request)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Extension point for injectors outside the built-in set
///
/// Implementations are shared across concurrent requests and must not rely
/// on per-call mutable state.
#[async_trait]
pub trait CustomInjector: Send + Sync + fmt::Debug {
    /// Handle a request for which the fault fired
    async fn inject(&self, request: Request, next: Next) -> Result<Response, BoxError>;
}

/// The strategy run when a fault fires
#[derive(Debug, Clone)]
pub enum Injector {
    /// End the request without writing a response
    Reject(RejectInjector),
    /// Respond with a fixed status code
    Error(ErrorInjector),
    /// Delay before continuing
    Slow(SlowInjector),
    /// Run several injectors in order as one unit
    Chain(ChainInjector),
    /// User supplied behaviour
    Custom(Arc<dyn CustomInjector>),
}

impl Injector {
    /// Injector that rejects every request
    pub const fn reject() -> Self {
        Self::Reject(RejectInjector::new())
    }

    /// Injector responding with `status_code`; inert if the code is invalid
    pub fn error(status_code: u16) -> Self {
        Self::Error(ErrorInjector::new(status_code))
    }

    /// Injector delaying every request by `delay`
    pub const fn slow(delay: std::time::Duration) -> Self {
        Self::Slow(SlowInjector::new(delay))
    }

    /// Injector running `injectors` in order; inert if empty
    pub fn chain(injectors: impl IntoIterator<Item = Self>) -> Self {
        Self::Chain(ChainInjector::new(injectors))
    }

    /// Wrap a custom injector
    pub fn custom(injector: impl CustomInjector + 'static) -> Self {
        Self::Custom(Arc::new(injector))
    }

    /// Whether this injector always passes requests through untouched
    pub fn is_inert(&self) -> bool {
        match self {
            Self::Reject(_) | Self::Custom(_) => false,
            Self::Error(injector) => injector.is_inert(),
            Self::Slow(injector) => injector.is_inert(),
            Self::Chain(injector) => injector.is_inert(),
        }
    }

    /// Short name used in logs and metrics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Reject(_) => "reject",
            Self::Error(_) => "error",
            Self::Slow(_) => "slow",
            Self::Chain(_) => "chain",
            Self::Custom(_) => "custom",
        }
    }

    /// Run the injector for a request whose fault fired
    pub fn apply(&self, request: Request, next: Next) -> InjectFuture {
        match self {
            Self::Reject(injector) => injector.apply(request, next),
            Self::Error(injector) => injector.apply(request, next),
            Self::Slow(injector) => injector.apply(request, next),
            Self::Chain(injector) => injector.apply(request, next),
            Self::Custom(injector) => {
                let injector = Arc::clone(injector);
                async move { injector.inject(request, next).await }.boxed()
            },
        }
    }
}

impl From<RejectInjector> for Injector {
    fn from(injector: RejectInjector) -> Self {
        Self::Reject(injector)
    }
}

impl From<ErrorInjector> for Injector {
    fn from(injector: ErrorInjector) -> Self {
        Self::Error(injector)
    }
}

impl From<SlowInjector> for Injector {
    fn from(injector: SlowInjector) -> Self {
        Self::Slow(injector)
    }
}

impl From<ChainInjector> for Injector {
    fn from(injector: ChainInjector) -> Self {
        Self::Chain(injector)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{Router, http::StatusCode, routing::get};
    use parking_lot::Mutex;

    use super::testing::{Recording, body_text, counting_next, request};
    use super::*;

    #[tokio::test]
    async fn next_from_service_reaches_router() {
        let router = Router::new().route("/ping", get(|| async { "pong" }));
        let response = Next::from_service(router)
            .run(request("/ping"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "pong");
    }

    #[tokio::test]
    async fn next_from_ready_service_calls_without_polling_again() {
        let mut router = Router::new().route("/ping", get(|| async { "pong" }));
        ServiceExt::<Request>::ready(&mut router).await.unwrap();

        let response = Next::from_ready_service(router)
            .run(request("/ping"))
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "pong");
    }

    #[tokio::test]
    async fn custom_injector_is_applied() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let injector = Injector::custom(Recording {
            label: "custom",
            log: Arc::clone(&log),
        });

        let response = injector
            .apply(request("/"), counting_next(&calls))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*log.lock(), vec!["custom"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn kinds() {
        assert_eq!(Injector::reject().kind(), "reject");
        assert_eq!(Injector::error(500).kind(), "error");
        assert_eq!(
            Injector::slow(std::time::Duration::from_millis(1)).kind(),
            "slow"
        );
        assert_eq!(Injector::chain([Injector::reject()]).kind(), "chain");
    }

    #[test]
    fn inert_detection() {
        assert!(!Injector::reject().is_inert());
        assert!(!Injector::error(502).is_inert());
        assert!(Injector::error(0).is_inert());
        assert!(Injector::chain([]).is_inert());
        assert!(!Injector::chain([Injector::reject()]).is_inert());
        assert!(Injector::chain([Injector::error(0)]).is_inert());
    }

    #[test]
    fn next_debug() {
        let next = Next::new(|_request| async { Err::<Response, BoxError>("unused".into()) });
        assert!(format!("{next:?}").contains("Next"));
    }
}
