//! Host-based tenant routing
//!
//! This module decides, for every inbound request, which tenant it belongs
//! to and how it should be served:
//! - Tenant subdomains: joes-coffee.yourplatform.com -> internal rewrite to
//!   /store/joes-coffee/...
//! - Custom domains: mystore.com -> directory lookup, same rewrite
//! - The admin host: admin.yourplatform.com/store/{id}/... -> id via header
//! - Development: localhost with ?subdomain= / ?merchant= overrides

mod access;
mod cache;
mod host;
mod identifier;
mod middleware;
mod rewrite;

pub use access::{classify_access, AccessClass, AUTH_EXEMPT_PREFIXES, PUBLIC_PREFIXES};
pub use cache::{CacheStats, TenantCache};
pub use host::{HostClassification, HostClassifier};
pub use identifier::extract_identifier;
pub use middleware::{tenant_routing, TenantContext};
pub use rewrite::{decide, CookieSpec, RouteDecision, COOKIE_MAX_AGE_SECS};

/// The narrow view of an incoming request this module is allowed to see.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub host: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
}
