use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::signal;
use tracing::{error, info};

use crate::api::{create_router, AppState};
use crate::error::{Result, WineError};

/// HTTP front end serving the form and prediction pages
pub struct WebServer {
    state: AppState,
    addr: SocketAddr,
    static_dir: PathBuf,
}

impl WebServer {
    pub fn new(state: AppState, addr: SocketAddr, static_dir: PathBuf) -> Self {
        Self {
            state,
            addr,
            static_dir,
        }
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state, &self.static_dir);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Starting web server on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| WineError::Server(format!("web server error: {e}")))?;

        info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
