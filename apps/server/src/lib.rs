//! # UniReg Server
//!
//! Course registration over REST, built on `Axum`, file snapshots and a typed event bus.
//!
//! ## Example
//! ```no_run
//! use unireg_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use std::net::SocketAddr;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use unireg::domain::config::ApiConfig;
use unireg::features::enrollment::{Enrollment, EnrollmentEvent};
use unireg::kernel::server::ApiState;
use unireg_event_bus::{EventBus, EventReceiverExt};
use unireg_storage::{Compression, Storage};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    async fn init_storage(&self) -> Result<Storage> {
        let storage_cfg = &self.cfg.storage;
        let compression = if storage_cfg.compression { Compression::Lz4 } else { Compression::None };

        Storage::builder()
            .root(&storage_cfg.data_dir)
            .compression(compression)
            .connect()
            .await
            .with_context(|| format!("Failed to open data directory {}", storage_cfg.data_dir.display()))
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
                    warn!(key = %ssl.key.display(), "SSL private key is readable by group or others");
                }
            }
        }
        Ok(())
    }

    /// Validates TLS files, opens storage, restores the ledger and registers
    /// every slice.
    ///
    /// # Errors
    /// * SSL certificate or key files are missing.
    /// * The data directory cannot be created or opened.
    /// * A slice fails to initialize, e.g. an inconsistent ledger snapshot.
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, data_dir = %self.cfg.storage.data_dir.display(), "Initializing server");

        let storage = self.init_storage().await?;
        let events = EventBus::new();
        let slices = unireg::init(&self.cfg, &storage, &events)
            .await
            .map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        let state = slices
            .into_iter()
            .fold(
                ApiState::builder().config(self.cfg).storage(storage).events(events),
                |builder, slice| builder.register_slice(slice),
            )
            .build()
            .context("Failed to finalize API state registry")?;
        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves until SIGINT/SIGTERM, then flushes the ledger snapshot and
    /// closes the event bus.
    ///
    /// # Errors
    /// Binding the address or loading TLS certificates fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        info!(address = %address, ssl = cfg.server.ssl.is_some(), "Starting server");

        let event_log = spawn_event_log(&self.state);
        let app = router::init(self.state.clone());

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        let served = if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");
            let tls_config =
                axum_server::tls_rustls::RustlsConfig::from_pem_file(&ssl_config.cert, &ssl_config.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")
        } else {
            info!("Starting HTTP server on http://{address}");
            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")
        };

        self.shutdown(event_log).await;
        served?;

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    async fn shutdown(&self, event_log: Option<JoinHandle<()>>) {
        if let Some(enrollment) = self.state.get_slice::<Enrollment>() {
            match enrollment.flush().await {
                Ok(()) => info!(revision = enrollment.ledger.revision(), "Ledger snapshot flushed"),
                Err(e) => error!(error = %e, "Final ledger snapshot failed"),
            }
        }

        let closed = self.state.events.shutdown();
        info!(channels = closed, "Event bus closed");

        if let Some(task) = event_log
            && let Err(e) = task.await
        {
            warn!(error = %e, "Event log task ended abnormally");
        }
    }
}

/// Mirrors committed enrollment changes into the server log.
fn spawn_event_log(state: &ApiState) -> Option<JoinHandle<()>> {
    let enrollment = state.get_slice::<Enrollment>()?;
    let mut rx = match enrollment.subscribe() {
        Ok(rx) => rx,
        Err(e) => {
            warn!(error = %e, "Enrollment events will not be logged");
            return None;
        },
    };

    Some(tokio::spawn(async move {
        while let Some(event) = rx.next_event().await {
            log_event(&event);
        }
    }))
}

fn log_event(event: &EnrollmentEvent) {
    match event {
        EnrollmentEvent::Submitted { student, added, removed } => {
            info!(%student, added = added.len(), removed = removed.len(), "event: submitted");
        },
        EnrollmentEvent::Enrolled { student, course, remaining }
        | EnrollmentEvent::Dropped { student, course, remaining } => {
            info!(kind = event.kind(), %student, %course, remaining, "event: seat change");
        },
        EnrollmentEvent::StudentRegistered { student } => info!(%student, "event: registered"),
    }
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res.context("Ctrl+C signal received")?,
        res = terminate => res.context("SIGTERM signal received")?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unireg::domain::config::SslConfig;

    fn config(data_dir: &std::path::Path) -> ApiConfig {
        let mut cfg = ApiConfig::default();
        cfg.storage.data_dir = data_dir.to_path_buf();
        cfg
    }

    #[tokio::test]
    async fn build_registers_enrollment() {
        let temp = tempfile::TempDir::new().unwrap();
        let server = Server::builder().config(config(&temp.path().join("data"))).port(0).build().await.unwrap();

        assert!(server.state().get_slice::<Enrollment>().is_some());
        assert_eq!(server.state().config.server.port, 0);
        assert!(temp.path().join("data").is_dir());
    }

    #[tokio::test]
    async fn missing_certificate_fails_fast() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut cfg = config(temp.path());
        cfg.server.ssl =
            Some(SslConfig { cert: temp.path().join("cert.pem"), key: temp.path().join("key.pem") });

        let err = Server::builder().config(cfg).build().await.unwrap_err();
        assert!(err.to_string().contains("SSL certificate not found"), "{err}");
    }

    #[tokio::test]
    async fn compression_setting_reaches_storage() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut cfg = config(temp.path());
        cfg.storage.compression = true;

        let server = Server::builder().config(cfg).build().await.unwrap();
        assert_eq!(server.state().storage.compression(), Compression::Lz4);
    }
}
