//! Server bootstrap

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::routes::router;
use relay_core::{FileTokenStore, Forwarder, Settings, UpstreamTarget};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Relay HTTP server
pub struct RelayServer {
    forwarder: Arc<Forwarder>,
    bind_addr: String,
    max_concurrent_requests: usize,
}

impl RelayServer {
    /// Create a new server around a forwarder
    pub fn new(forwarder: Arc<Forwarder>) -> Self {
        let defaults = Settings::default();
        Self {
            forwarder,
            bind_addr: defaults.bind_addr(),
            max_concurrent_requests: defaults.max_concurrent_requests,
        }
    }

    /// Build a server reading tokens from the configured directory
    pub fn from_settings(settings: &Settings) -> relay_core::Result<Self> {
        settings.validate()?;

        let store = FileTokenStore::new(settings.tokens_dir.clone());
        if !store.tokens_dir().is_dir() {
            warn!(
                "Tokens directory {:?} does not exist; every request will fail until it is provisioned",
                store.tokens_dir()
            );
        }

        let target = settings.upstream_target()?;
        match &target {
            UpstreamTarget::Fixed(url) => info!("Forwarding to {}", url),
            UpstreamTarget::PathSupplied { allowed_hosts, .. } => {
                info!("Forwarding to path-supplied hosts: {}", allowed_hosts.join(", "))
            }
        }
        info!("Reading tokens from {:?}", store.tokens_dir());

        let forwarder = Forwarder::new(Arc::new(store), target, &settings.http)?;

        Ok(Self::new(Arc::new(forwarder))
            .with_bind_addr(settings.bind_addr())
            .with_max_concurrent_requests(settings.max_concurrent_requests))
    }

    /// Set the address to bind
    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    /// Address the server binds
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// In-flight request cap
    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    /// Set the in-flight request cap
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Bind and run until Ctrl-C or SIGTERM
    pub async fn run(&self) -> Result<(), BoxError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        info!("Relay listening on http://{}", listener.local_addr()?);

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an existing listener until `shutdown` resolves
    pub async fn serve<F>(
        &self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), BoxError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.forwarder.clone(), self.max_concurrent_requests);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Relay stopped");
        Ok(())
    }
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{HttpSettings, MemoryTokenStore};

    fn forwarder() -> Arc<Forwarder> {
        let target = UpstreamTarget::fixed("https://api.example.com").unwrap();
        let forwarder = Forwarder::new(
            Arc::new(MemoryTokenStore::new()),
            target,
            &HttpSettings::default(),
        )
        .unwrap();
        Arc::new(forwarder)
    }

    #[test]
    fn test_defaults_follow_settings() {
        let server = RelayServer::new(forwarder());
        let defaults = Settings::default();

        assert_eq!(server.bind_addr(), defaults.bind_addr());
        assert_eq!(
            server.max_concurrent_requests(),
            defaults.max_concurrent_requests
        );
    }

    #[test]
    fn test_builder_overrides() {
        let server = RelayServer::new(forwarder())
            .with_bind_addr("127.0.0.1:8080")
            .with_max_concurrent_requests(4);

        assert_eq!(server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(server.max_concurrent_requests(), 4);
    }
}
