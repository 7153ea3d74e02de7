//! Fault injection HTTP server
//!
//! Hosts a small axum application behind the fault injection middleware.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use config::{AppConfig, ServerConfig};
pub use middleware::{RequestCancellationLayer, RequestCancellationService};
pub use routes::{App, create_app, create_router};
pub use server::HttpServer;
