//! Application startup and lifecycle management.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::config::Config;
use crate::error::AppError;
use crate::store::{SharedStore, SqliteStore};

/// A connected store plus a bound listener, ready to serve.
pub struct Application {
    port: u16,
    listener: TcpListener,
    store: SharedStore,
}

impl Application {
    /// Connects the store, reconciles the schema and binds the listener.
    /// Any failure here is fatal for the process.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let store = SqliteStore::connect(&config.database).await.map_err(|e| {
            tracing::error!("Failed to open store: {}", e);
            e
        })?;

        // Port 0 binds a random port, used by tests.
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            store: Arc::new(store),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!(port = self.port, "Todo service listening");
        crate::run(self.listener, self.store).await
    }
}

pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
