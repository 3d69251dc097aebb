//! Server host holding the shared application state
//!
//! The host is built once by [`ServerBuilder`](super::ServerBuilder) and
//! shared behind an `Arc` by every route.

use std::sync::Arc;
use std::time::Instant;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::core::auth::{AuthError, AuthPolicies, IdentityProvider};
use crate::orders::OrderService;

/// Host context containing all service state
pub struct ServerHost {
    /// Effective configuration after file and environment merging
    pub config: Arc<AppConfig>,

    /// Order lifecycle operations
    pub orders: Arc<OrderService>,

    /// Bearer token verification
    pub identity: Arc<dyn IdentityProvider>,

    /// Per-operation authorization
    pub policies: Arc<AuthPolicies>,

    pub catalog: Catalog,

    pub started_at: Instant,
}

impl ServerHost {
    pub fn from_builder_components(
        config: AppConfig,
        orders: OrderService,
        identity: Arc<dyn IdentityProvider>,
        catalog: Catalog,
    ) -> Result<Self, AuthError> {
        let policies = AuthPolicies::from_config(&config.auth.policies)?;
        Ok(Self {
            config: Arc::new(config),
            orders: Arc::new(orders),
            identity,
            policies: Arc::new(policies),
            catalog,
            started_at: Instant::now(),
        })
    }

    pub fn storage_backend(&self) -> &'static str {
        self.orders.store().backend_name()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
