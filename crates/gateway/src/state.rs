//! Shared application state

use std::sync::Arc;

use crate::config::{Config, RoutingConfig};
use crate::directory::{DirectoryClient, DirectoryError};
use crate::resolver::TenantResolver;
use crate::routing::{HostClassifier, TenantCache};

/// State shared across handlers and the routing middleware. Everything here
/// is immutable or internally synchronized.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub classifier: HostClassifier,
    pub resolver: Arc<TenantResolver>,
    routing: Arc<RoutingConfig>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, DirectoryError> {
        let routing = config.routing();
        let classifier = HostClassifier::new(&routing);
        let directory = DirectoryClient::new(&config.directory_url, config.directory_timeout())?;
        let cache = TenantCache::new(
            config.cache_ttl(),
            config.cache_capacity,
            config.cache_grace(),
        );
        let resolver = Arc::new(TenantResolver::new(cache, directory));

        Ok(Self {
            config: Arc::new(config),
            classifier,
            resolver,
            routing: Arc::new(routing),
        })
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn is_production(&self) -> bool {
        self.config.environment.is_production()
    }
}
