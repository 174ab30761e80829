//! Storegate Gateway Library
//!
//! This crate contains the multi-tenant edge gateway: host classification,
//! tenant identifier extraction, access classification, internal path
//! rewriting, context propagation, and the cache-fronted tenant resolver.

pub mod config;
pub mod directory;
pub mod error;
pub mod resolver;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::Config;
pub use error::{GatewayError, GatewayResult};
pub use resolver::TenantResolver;
pub use routing::{AccessClass, HostClassification, HostClassifier, RouteDecision, TenantContext};
pub use state::AppState;
