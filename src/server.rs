//! Reusable parking spot server runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full server lifecycle:
//! storage load, service wiring, REST API + WebSocket update stream, and
//! graceful shutdown. The CLI's one-shot commands reuse [`build_service`]
//! so they see the same store and resolver the server would.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::application::{SharedSpotService, SpotRegistry, SpotService, UpdateBroadcaster};
use crate::config::{AppConfig, GeocoderProvider};
use crate::domain::{AddressResolver, LocationProvider, SpotStore};
use crate::infrastructure::{
    FixedLocationProvider, InMemoryStore, JsonFileStore, MockAddressResolver, NoLocationProvider,
    NominatimResolver,
};
use crate::interfaces::create_api_router;
use crate::support::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the server.
#[derive(Default)]
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running parking spot server.
///
/// # Examples
///
/// ```rust,no_run
/// use parkspot::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Spot service shared with the HTTP handlers.
    pub service: SharedSpotService,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is listening on.
    pub local_addr: std::net::SocketAddr,

    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Build the service and start serving the REST API.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        info!("Starting parkspot server...");

        let service = build_service(&config)?;
        info!(spots = service.list().await.len(), "Spot registry loaded");

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let api_router = create_api_router(service.clone());
        let api_addr = config.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, "REST API server listening");
        info!("Spot updates WebSocket at ws://{}/api/v1/ws/spots", local_addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            service,
            config,
            local_addr,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for shutdown to be triggered and the API task to drain.
    ///
    /// Open WebSocket connections keep the server alive, so draining is
    /// bounded by the configured shutdown timeout.
    pub async fn wait(self) {
        let api_task = self.api_task;
        let abort = api_task.abort_handle();
        let drained = self
            .shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!(error = %e, "REST API server task panicked");
                }
            })
            .await;
        if !drained {
            abort.abort();
        }

        info!("parkspot shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down parkspot server...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Wiring ─────────────────────────────────────────────────────────

/// Assemble the spot service from configuration: store, registry,
/// address resolver and location provider.
pub fn build_service(config: &AppConfig) -> Result<SharedSpotService, Box<dyn std::error::Error>> {
    let store: Arc<dyn SpotStore> = match config.storage.snapshot_path() {
        Some(path) => {
            info!(path = %path.display(), "Using JSON file spot store");
            Arc::new(JsonFileStore::new(path))
        }
        None => {
            info!("Using in-memory spot store");
            Arc::new(InMemoryStore::new())
        }
    };

    let resolver: Arc<dyn AddressResolver> = match config.geocoder.provider {
        GeocoderProvider::Nominatim => Arc::new(NominatimResolver::new(
            config.geocoder.base_url.clone(),
            &config.geocoder.user_agent,
            Duration::from_secs(config.geocoder.timeout_secs),
        )?),
        GeocoderProvider::Mock => Arc::new(MockAddressResolver::new()),
    };

    let location: Arc<dyn LocationProvider> = if config.location.denied {
        Arc::new(NoLocationProvider::denied())
    } else {
        match config.location.fixed() {
            Some(location) => Arc::new(FixedLocationProvider::new(location)),
            None => Arc::new(NoLocationProvider::unavailable()),
        }
    };

    let registry = SpotRegistry::load_initial(store, UpdateBroadcaster::new());
    let service = SpotService::new(registry, resolver, location)
        .with_radius_km(config.proximity.radius_km)
        .with_resolve_timeout(Duration::from_secs(config.geocoder.timeout_secs));

    Ok(Arc::new(service))
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// Logs go to stderr so CLI command output on stdout stays parseable.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.server.shutdown_timeout = 1;
        config.storage = StorageConfig {
            path: None,
            in_memory: true,
        };
        config.geocoder.provider = GeocoderProvider::Mock;
        config
    }

    #[tokio::test]
    async fn build_service_honors_location_config() {
        let mut config = test_config();
        config.location.latitude = Some(48.8566);
        config.location.longitude = Some(2.3522);
        let service = build_service(&config).unwrap();
        let added = service.add_spot_here().await.unwrap();
        assert!(added.spot.address.is_some());

        config.location.denied = true;
        let denied = build_service(&config).unwrap();
        assert!(matches!(
            denied.add_spot_here().await,
            Err(crate::domain::DomainError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn file_store_survives_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.storage = StorageConfig {
            path: Some(dir.path().join("spots.json")),
            in_memory: false,
        };

        let first = build_service(&config).unwrap();
        first
            .add_spot(crate::domain::Location::new(48.85, 2.35).unwrap())
            .await
            .unwrap();

        let second = build_service(&config).unwrap();
        assert_eq!(second.list().await.len(), 1);
    }

    #[tokio::test]
    async fn server_starts_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
        })
        .await
        .unwrap();
        assert!(handle.is_running());
        assert_ne!(handle.local_addr.port(), 0);

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .unwrap();
    }
}
