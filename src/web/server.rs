//! Web server for StudySync.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::library::{sweep_orphans, BlobStore};
use crate::{Database, Result, StudySyncError};

use super::handlers::AppState;
use super::openapi::create_swagger_router;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Upload size limit in bytes.
    max_upload_bytes: u64,
    /// Minimum age of a pending marker before the sweep resolves it.
    orphan_grace: Duration,
}

impl WebServer {
    /// Create a new web server, preparing the blob store.
    pub async fn new(config: &Config, db: Database) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| StudySyncError::Config(format!("invalid server address: {e}")))?;

        let storage = BlobStore::new(&config.storage.root).await?;
        tracing::info!("File storage initialized at: {}", config.storage.root);

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(db, storage, config)),
            cors_origins: config.server.cors_origins.clone(),
            max_upload_bytes: config.storage.max_upload_bytes(),
            orphan_grace: Duration::from_secs(config.storage.orphan_grace_secs),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the full application router.
    pub fn router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            &self.cors_origins,
            self.max_upload_bytes,
        )
        .merge(create_health_router())
        .merge(create_swagger_router())
    }

    /// Start the orphan sweep background task.
    ///
    /// Runs every `grace` interval and resolves markers older than `grace`.
    fn start_sweep_task(state: Arc<AppState>, grace: Duration) {
        tokio::spawn(async move {
            let period = grace.max(Duration::from_secs(60));
            let mut interval = tokio::time::interval(period);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match sweep_orphans(state.db.pool(), state.storage(), grace).await {
                    Ok(report) if report.examined == 0 => {
                        tracing::debug!("No pending blobs to resolve");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Orphan sweep failed");
                    }
                }
            }
        });
    }

    /// Resolve every pending marker left by a previous run.
    async fn startup_sweep(&self) -> Result<()> {
        let report = sweep_orphans(
            self.app_state.db.pool(),
            self.app_state.storage(),
            Duration::ZERO,
        )
        .await?;
        tracing::info!(
            examined = report.examined,
            removed_blobs = report.removed_blobs,
            "Startup sweep finished"
        );
        Ok(())
    }

    async fn bind(self) -> Result<(TcpListener, Router)> {
        self.startup_sweep().await?;

        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;

        // Start the sweep only after a successful bind
        Self::start_sweep_task(self.app_state.clone(), self.orphan_grace);
        tracing::info!(
            grace_secs = self.orphan_grace.as_secs(),
            "Orphan sweep task started"
        );

        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> Result<()> {
        let (listener, router) = self.bind().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
