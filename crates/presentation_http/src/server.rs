//! HTTP server
//!
//! Serves the layered application over hyper HTTP/1.1 connections, one tokio
//! task per connection. A service error (a rejected or cancelled request)
//! makes hyper abort the connection without writing a response, so clients
//! see an empty reply.

use std::{io, time::Duration};

use axum::body::Body;
use hyper::{body::Incoming, server::conn::http1};
use hyper_util::{rt::TokioIo, server::graceful::GracefulShutdown, service::TowerToHyperService};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{debug, info, warn};

use crate::routes::App;

/// HTTP server for the fault-injected application
#[derive(Debug)]
pub struct HttpServer {
    app: App,
    shutdown: CancellationToken,
    drain_timeout: Duration,
}

impl HttpServer {
    /// Create a server; cancelling `shutdown` stops it
    pub const fn new(app: App, shutdown: CancellationToken, drain_timeout: Duration) -> Self {
        Self {
            app,
            shutdown,
            drain_timeout,
        }
    }

    /// Accept connections until shutdown, then drain open connections
    pub async fn run(self, listener: TcpListener) -> io::Result<()> {
        info!(addr = %listener.local_addr()?, "HTTP server listening");

        let graceful = GracefulShutdown::new();

        loop {
            let (stream, remote) = tokio::select! {
                () = self.shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        continue;
                    },
                },
            };

            let service = TowerToHyperService::new(
                self.app
                    .clone()
                    .map_request(|request: hyper::Request<Incoming>| request.map(Body::new)),
            );
            let connection = graceful.watch(
                http1::Builder::new().serve_connection(TokioIo::new(stream), service),
            );

            tokio::spawn(async move {
                if let Err(err) = connection.await {
                    debug!(%remote, error = %err, "Connection closed without response");
                }
            });
        }

        info!(timeout = ?self.drain_timeout, "Waiting for connections to close");
        tokio::select! {
            () = graceful.shutdown() => info!("All connections closed"),
            () = tokio::time::sleep(self.drain_timeout) => {
                warn!("Timed out waiting for connections to close");
            },
        }

        Ok(())
    }
}
