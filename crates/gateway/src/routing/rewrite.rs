//! Path routing decisions
//!
//! Computes the single `RouteDecision` for a request: the internal path
//! rewrite (storefront URLs map to `/store/{identifier}/...` without the
//! browser-visible URL changing), the propagation headers, and the client
//! bootstrap cookies. The decision is a plain value applied atomically by
//! the middleware; an unresolvable tenant is a normal decision state, not
//! an error.

use storegate_shared::{
    IdentifierKind, TENANT_IDENTIFIER_COOKIE, TENANT_IDENTIFIER_HEADER,
    TENANT_IDENTIFIER_TYPE_COOKIE, TENANT_IDENTIFIER_TYPE_HEADER,
};

use super::access::AccessClass;
use super::host::HostClassification;

/// Bootstrap cookie lifetime. The cookies are hints for client rendering
/// only; the server re-derives identity from the Host header every request.
pub const COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// A cookie the propagator should set on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: &'static str,
    pub value: String,
    pub max_age_secs: i64,
    pub http_only: bool,
    pub secure: bool,
    pub same_site_lax: bool,
}

/// The per-request routing decision, produced once and applied atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub access: AccessClass,
    /// Candidate identifier and how it was derived, if any
    pub identifier: Option<(String, IdentifierKind)>,
    /// Internal path to serve instead of the requested one
    pub rewritten_path: Option<String>,
    /// Headers for the outgoing (downstream) request, in order
    pub headers: Vec<(&'static str, String)>,
    /// Cookies for the response
    pub cookies: Vec<CookieSpec>,
    /// Tenant identity was required but could not be derived. The caller
    /// passes the request through; this is the normal state for the bare
    /// root domain and the admin shell.
    pub unresolved: bool,
}

/// Compute the route decision for a classified, extracted request.
pub fn decide(
    classification: HostClassification,
    identifier: Option<(String, IdentifierKind)>,
    access: AccessClass,
    original_path: &str,
    is_production: bool,
) -> RouteDecision {
    let mut headers = Vec::new();
    let mut cookies = Vec::new();

    if let Some((id, kind)) = &identifier {
        headers.push((TENANT_IDENTIFIER_HEADER, id.clone()));
        headers.push((TENANT_IDENTIFIER_TYPE_HEADER, kind.as_str().to_string()));

        // Non-httpOnly: client-side tenant-aware rendering reads these.
        cookies.push(CookieSpec {
            name: TENANT_IDENTIFIER_COOKIE,
            value: id.clone(),
            max_age_secs: COOKIE_MAX_AGE_SECS,
            http_only: false,
            secure: is_production,
            same_site_lax: true,
        });
        cookies.push(CookieSpec {
            name: TENANT_IDENTIFIER_TYPE_COOKIE,
            value: kind.as_str().to_string(),
            max_age_secs: COOKIE_MAX_AGE_SECS,
            http_only: false,
            secure: is_production,
            same_site_lax: true,
        });
    }

    let rewritten_path = match (&identifier, access) {
        (Some((id, _)), AccessClass::TenantScoped)
            if is_storefront(classification) && !is_api_path(original_path) =>
        {
            Some(format!("/store/{}{}", id, original_path))
        }
        _ => None,
    };

    let unresolved = access == AccessClass::TenantScoped && identifier.is_none();

    RouteDecision {
        access,
        identifier,
        rewritten_path,
        headers,
        cookies,
        unresolved,
    }
}

/// Storefront hosts get the internal rewrite; the admin host does not,
/// because the admin UI already encodes the merchant id in its own paths.
fn is_storefront(classification: HostClassification) -> bool {
    matches!(
        classification,
        HostClassification::TenantSubdomain
            | HostClassification::CustomDomain
            | HostClassification::LocalDevelopment
    )
}

/// `/api/...` paths are never rewritten so API route matching keeps
/// working; the identifier still travels via header.
fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
