use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_origin_router::{
    app, build_router,
    config::{AppConfig, LogFormat, RouterConfig},
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = Arc::new(AppConfig::new());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }
    debug!(
        "Configuration loaded: port={}, host={}, default_scheme={}",
        config.port, config.host, config.default_scheme
    );

    let router_config = match RouterConfig::new() {
        Ok(router_config) => Arc::new(router_config),
        Err(e) => {
            error!("Invalid router configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        organization_id = %router_config.organization_id,
        alternate_origin = %router_config.alternate_origin,
        patterns = router_config.agent_patterns.len(),
        "Router configuration ready"
    );

    let service = app(config.clone(), build_router(router_config));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Agent origin router listening on {}", addr);

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            error!("Server error: {}", e);
            std::process::exit(1);
        });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler")
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {
            debug!("CTRL+C signal received");
        },
        _ = terminate => {
            debug!("Terminate signal received");
        },
    }
    info!("Shutdown signal received, starting graceful shutdown");
}
