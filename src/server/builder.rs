//! ServerBuilder for fluent API to build the HTTP server

use super::host::ServerHost;
use super::router::{build_routes, json_error_envelope};
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::core::auth::{IdentityProvider, JwtIdentityProvider, NoIdentityProvider};
use crate::core::store::OrderStore;
use crate::notify::{NotificationDispatcher, Notifier, build_notifier};
use crate::orders::{OrderIdGenerator, OrderService};
use anyhow::{Context, Result};
use axum::{Router, middleware};
use axum::http::{HeaderValue, StatusCode};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Builder for the order service HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::load()?)
///     .with_order_store(InMemoryOrderStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn OrderStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    id_generator: Option<Arc<dyn OrderIdGenerator>>,
    catalog: Option<Catalog>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
            notifier: None,
            identity: None,
            id_generator: None,
            catalog: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the order store (required)
    pub fn with_order_store(mut self, store: impl OrderStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared order store (required unless `with_order_store` is used)
    pub fn with_shared_order_store(mut self, store: Arc<dyn OrderStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the notifier chosen by `notifications.provider`
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Override the identity provider derived from `auth.jwt_secret`
    pub fn with_identity_provider(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identity = Some(Arc::new(provider));
        self
    }

    pub fn with_id_generator(mut self, ids: impl OrderIdGenerator + 'static) -> Self {
        self.id_generator = Some(Arc::new(ids));
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build the shared host
    pub fn build_host(mut self) -> Result<ServerHost> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("OrderStore is required. Call .with_order_store()"))?;

        let notifier = match self.notifier.take() {
            Some(notifier) => notifier,
            None => build_notifier(&self.config.notifications)?,
        };
        let dispatcher = NotificationDispatcher::new(notifier, self.config.notifications.timeout());

        let identity: Arc<dyn IdentityProvider> = match (self.identity.take(), &self.config.auth.jwt_secret) {
            (Some(provider), _) => provider,
            (None, Some(secret)) if !secret.is_empty() => Arc::new(JwtIdentityProvider::new(secret)),
            (None, _) => {
                tracing::warn!("auth.jwt_secret is not set; bearer tokens will be rejected");
                Arc::new(NoIdentityProvider)
            }
        };

        let mut orders = OrderService::new(store, dispatcher)
            .with_pricing(self.config.pricing.clone())
            .with_transition_policy(self.config.lifecycle.transition_policy);
        if let Some(ids) = self.id_generator.take() {
            orders = orders.with_id_generator(ids);
        }

        tracing::info!(
            storage = orders.store().backend_name(),
            notifier = %self.config.notifications.provider,
            transition_policy = ?self.config.lifecycle.transition_policy,
            "order service configured"
        );

        let host = ServerHost::from_builder_components(
            self.config,
            orders,
            identity,
            self.catalog.unwrap_or_default(),
        )
        .context("invalid auth.policies")?;
        Ok(host)
    }

    /// Build the final router with tracing, CORS and request timeout layers
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        let server = &host.config.server;

        let cors = cors_layer(&server.allowed_origins);
        let timeout = TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, server.request_timeout());

        Ok(build_routes(host)
            .layer(timeout)
            .layer(middleware::from_fn(json_error_envelope))
            .layer(cors)
            .layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Empty or `*` allows any origin
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(origins)
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
