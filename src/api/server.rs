//! HTTP server lifecycle.
//!
//! `serve` runs the panel API in the foreground until Ctrl-C.
//! `start_server_on` binds, spawns the server in a background task and
//! returns a handle with a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::patient_api_router;
use crate::api::types::ApiContext;
use crate::config::ServerConfig;
use crate::store::PanelStore;

/// Handle to a running background server.
pub struct PanelServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PanelServer {
    /// Signal graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Server shutdown signal sent");
        }
    }

    /// Shut down and wait for in-flight requests to finish.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Err(e) = self.task.await {
            tracing::error!("Server task ended abnormally: {e}");
        }
    }
}

/// Start the API on `addr` (port 0 picks an ephemeral port).
pub async fn start_server_on(
    addr: SocketAddr,
    ctx: ApiContext,
    allowed_origins: &[String],
) -> Result<PanelServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = patient_api_router(ctx, allowed_origins);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        tracing::info!(%addr, "Server started");
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Server error: {e}");
        }
        tracing::info!("Server stopped");
    });

    Ok(PanelServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Run the API with `config` until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), String> {
    tracing::info!(
        records = %config.records_path().display(),
        state = %config.state_path().display(),
        "Using patient documents"
    );
    let store = PanelStore::open(&config.data_dir, &config.records_file, &config.state_file);
    let server =
        start_server_on(config.bind_addr(), ApiContext::new(store), &config.allowed_origins)
            .await?;

    tracing::info!("Listening on http://{}", server.addr);

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl-C: {e}"))?;
    tracing::info!("Ctrl-C received, shutting down");

    server.stop().await;
    Ok(())
}
