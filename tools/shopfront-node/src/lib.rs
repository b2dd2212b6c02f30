//! Shop catalog HTTP service.
//!
//! Serves the storefront's public product listing (search, category filter,
//! price bounds, sort, offset pagination), product detail and category list
//! over a pluggable [`store::CatalogStore`].

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use routes::AppState;
use shopfront_common::query::PageLimits;
use store::CatalogStore;

/// Install the global `fmt` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Serve the catalog on `listener` until `shutdown` resolves.
pub async fn serve<S, F>(
    listener: TcpListener,
    store: Arc<S>,
    limits: PageLimits,
    shutdown: F,
) -> std::io::Result<()>
where
    S: CatalogStore,
    F: Future<Output = ()> + Send + 'static,
{
    let app = routes::router(AppState::new(store, limits));
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "shop catalog listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown requested");
}
