//! HTTP fault injection middleware
//!
//! Injects controlled faults (rejection, error responses, latency) into the
//! request path of an HTTP service for resilience testing.
//!
//! # Overview
//!
//! - [`Fault`]: decides per request whether a fault fires (enabled flag,
//!   path blacklist/whitelist, percentage sampling)
//! - [`Injector`]: what happens when it fires ([`RejectInjector`],
//!   [`ErrorInjector`], [`SlowInjector`], [`ChainInjector`], or a
//!   [`CustomInjector`])
//! - [`FaultLayer`]: tower middleware applying a fault to a service
//!
//! Invalid configuration never breaks the service: every constructor falls
//! back to an inert component that passes requests through unchanged. Use the
//! `try_*` constructors to surface configuration errors instead.
//!
//! # Example
//!
//! ```ignore
//! use fault::{Fault, FaultLayer, FaultOptions, Injector};
//! use std::time::Duration;
//!
//! // Slow 1% of requests by 10ms, then reject them
//! let fault = Fault::new(
//!     FaultOptions::new(
//!         1.0,
//!         Injector::chain([Injector::slow(Duration::from_millis(10)), Injector::reject()]),
//!     )
//!     .with_blacklist(["/health"]),
//! );
//!
//! let app = tower::ServiceBuilder::new()
//!     .layer(FaultLayer::new(fault))
//!     .service(router);
//! ```

pub mod config;
pub mod error;
pub mod fault;
pub mod injector;
pub mod layer;
pub mod path_filter;
pub mod random;

pub use config::{FaultConfig, InjectorConfig};
pub use error::{BoxError, ConfigError, FaultError};
pub use fault::{Decision, Fault, FaultOptions};
pub use injector::{
    ChainInjector, CustomInjector, ErrorInjector, InjectFuture, Injector, Next, RejectInjector,
    RequestCancellation, SlowInjector,
};
pub use layer::{FaultLayer, FaultService};
pub use path_filter::PathFilter;
pub use random::{FixedRandom, RandomSource, SeededRandom, ThreadRandom};
