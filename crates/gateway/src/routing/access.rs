//! Access classification for request paths
//!
//! Decides whether a path needs resolved tenant identity at all. Auth
//! routes are checked first: they must stay reachable even when no tenant
//! can be resolved, or nobody can ever sign in to fix the situation.

/// Paths exempt from tenant gating because the auth layer owns them.
pub const AUTH_EXEMPT_PREFIXES: &[&str] = &["/sign-in", "/sign-up", "/api/auth"];

/// Paths serveable without tenant identity. `/` is matched exactly, the
/// rest as path prefixes.
pub const PUBLIC_PREFIXES: &[&str] = &["/api/public", "/api/tenants/by-subdomain"];

/// Whether a path requires resolved tenant identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessClass {
    /// Serveable with no tenant and no principal
    Public,
    /// Auth surface; bypasses tenant gating entirely
    AuthExempt,
    /// Requires a resolved tenant
    TenantScoped,
}

/// Classify a normalized request path.
///
/// AuthExempt is checked before Public before the default.
pub fn classify_access(path: &str) -> AccessClass {
    if AUTH_EXEMPT_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        return AccessClass::AuthExempt;
    }
    if path == "/" || PUBLIC_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        return AccessClass::Public;
    }
    AccessClass::TenantScoped
}

/// Segment-aware prefix match: `/sign-in` matches `/sign-in` and
/// `/sign-in/callback` but not `/sign-internal`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
