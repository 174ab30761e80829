//! Application configuration

use std::env;
use std::time::Duration;

/// Deployment environment. Controls cookie `Secure` attributes and the
/// local-development identifier overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// What to serve for the bare primary domain (no subdomain, or `www`).
///
/// The two historical middlewares disagreed on this; it is now an explicit
/// operator choice with `AdminShell` as the tested default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootDomainMode {
    /// Serve the admin shell (no tenant identity)
    AdminShell,
    /// Fall back to the configured default tenant
    DefaultTenant,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub environment: Environment,

    // Routing
    pub primary_domain: String, // e.g. "yourplatform.com" for *.yourplatform.com storefronts
    pub admin_prefix: String,   // e.g. "admin." for the dashboard host
    pub root_domain_mode: RootDomainMode,
    pub default_tenant: String, // development fallback identifier

    // Tenant directory service
    pub directory_url: String,
    pub directory_timeout_ms: u64,

    // Resolution cache
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    pub cache_grace_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                "development" => Environment::Development,
                _ => return Err(ConfigError::Invalid("ENVIRONMENT")),
            },

            // Routing
            primary_domain: {
                let domain = env::var("PRIMARY_DOMAIN")
                    .map_err(|_| ConfigError::Missing("PRIMARY_DOMAIN"))?
                    .to_lowercase();
                if domain.is_empty() || domain.starts_with('.') || domain.ends_with('.') {
                    return Err(ConfigError::Invalid("PRIMARY_DOMAIN"));
                }
                domain
            },
            admin_prefix: {
                let prefix = env::var("ADMIN_PREFIX").unwrap_or_else(|_| "admin.".to_string());
                // A prefix without the trailing dot would match hosts like
                // "administrative.example.com"
                if !prefix.ends_with('.') {
                    return Err(ConfigError::Invalid("ADMIN_PREFIX"));
                }
                prefix
            },
            root_domain_mode: match env::var("ROOT_DOMAIN_MODE")
                .unwrap_or_else(|_| "admin".to_string())
                .as_str()
            {
                "admin" => RootDomainMode::AdminShell,
                "default-tenant" => RootDomainMode::DefaultTenant,
                _ => return Err(ConfigError::Invalid("ROOT_DOMAIN_MODE")),
            },
            default_tenant: env::var("DEFAULT_TENANT").unwrap_or_else(|_| "default".to_string()),

            // Tenant directory
            directory_url: env::var("DIRECTORY_URL")
                .map_err(|_| ConfigError::Missing("DIRECTORY_URL"))?,
            directory_timeout_ms: env::var("DIRECTORY_TIMEOUT_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap_or(2000),

            // Resolution cache
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            cache_capacity: env::var("CACHE_CAPACITY")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
            cache_grace_secs: env::var("CACHE_GRACE_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
        })
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_millis(self.directory_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_grace(&self) -> Duration {
        Duration::from_secs(self.cache_grace_secs)
    }

    /// Immutable view of the fields the routing hot path needs.
    ///
    /// The classifiers never read environment variables themselves.
    pub fn routing(&self) -> RoutingConfig {
        RoutingConfig {
            primary_domain: self.primary_domain.clone(),
            admin_prefix: self.admin_prefix.clone(),
            root_domain_mode: self.root_domain_mode,
            default_tenant: self.default_tenant.clone(),
            is_development: self.environment.is_development(),
        }
    }
}

/// The subset of configuration consumed by host classification and
/// identifier extraction. Constructed once, never mutated.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub primary_domain: String,
    pub admin_prefix: String,
    pub root_domain_mode: RootDomainMode,
    pub default_tenant: String,
    pub is_development: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
