//! Fault injection HTTP server
//!
//! Main entry point for the HTTP server.

use std::time::Duration;

use presentation_http::{AppConfig, HttpServer, create_app};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "fault_server=info,presentation_http=info,fault=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before tracing so the log format can be honored
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    init_tracing(config.server.json_logs());

    info!("🧪 fault-server v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = &loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let fault = config.fault.try_build().unwrap_or_else(|e| {
        warn!(error = %e, "Invalid fault configuration, fault injection disabled");
        config.fault.build()
    });

    info!(
        host = %config.server.host,
        port = %config.server.port,
        enabled = fault.enabled(),
        percent_of_requests = fault.percent_of_requests(),
        injector = fault.injector().map_or("none", |injector| injector.kind()),
        "Configuration loaded"
    );

    let shutdown = CancellationToken::new();
    let app = create_app(fault, &shutdown);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 Server listening on http://{}", addr);

    tokio::spawn(shutdown_signal(shutdown.clone()));

    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));
    HttpServer::new(app, shutdown, drain_timeout)
        .run(listener)
        .await?;

    info!("👋 Server shutdown complete");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM, then cancel `shutdown`
///
/// Cancelling the token stops accepting connections and aborts in-flight
/// injected delays.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("📥 Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("📥 Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown.cancel();
}
