use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use todo_api::{config::AppConfig, router, telemetry, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.logging)?;

    let state =
        AppState::open(&config.storage.path)?.with_trusted_proxy(config.server.trust_proxy_headers);
    let app = router(state.clone());

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, storage = %config.storage.path.display(), "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.read().await.flush()?;
    info!("shut down");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = sigterm => {},
    }
    info!("shutdown signal received, draining connections");
}
