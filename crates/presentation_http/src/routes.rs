//! Route definitions

use axum::{Router, routing::get};
use fault::{Fault, FaultLayer, FaultService};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    handlers,
    middleware::{RequestCancellationLayer, RequestCancellationService},
};

/// Fully layered application service
pub type App = RequestCancellationService<FaultService<Router>>;

/// Create the router with all routes
///
/// `fault` is only reported by `/health`; injection happens in [`create_app`].
pub fn create_router(fault: Fault) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(fault)
}

/// Wrap the router with fault injection and request cancellation
///
/// Order matters: the cancellation layer is outermost so the fault layer sees
/// the signal.
pub fn create_app(fault: Fault, shutdown: &CancellationToken) -> App {
    ServiceBuilder::new()
        .layer(RequestCancellationLayer::new(shutdown.clone()))
        .layer(FaultLayer::new(fault.clone()))
        .service(create_router(fault))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request, http::StatusCode};
    use fault::{FaultOptions, Injector};
    use tower::ServiceExt;

    use super::*;

    fn get_request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn routes_respond_without_faults() {
        let app = create_app(Fault::inert(), &CancellationToken::new());

        for path in ["/", "/health"] {
            let response = app.clone().oneshot(get_request(path)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = create_app(Fault::inert(), &CancellationToken::new())
            .oneshot(get_request("/missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fault_applies_to_routes() {
        let fault = Fault::new(
            FaultOptions::new(100.0, Injector::error(502)).with_blacklist(["/health"]),
        );
        let app = create_app(fault, &CancellationToken::new());

        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
