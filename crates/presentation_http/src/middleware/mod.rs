//! HTTP middleware components
//!
//! The fault layer itself lives in the `fault` crate; this module holds the
//! host-side pieces it relies on.

pub mod cancellation;

pub use cancellation::{RequestCancellationLayer, RequestCancellationService};
