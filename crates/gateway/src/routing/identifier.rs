//! Candidate tenant identifier extraction
//!
//! Derives a *candidate* identifier from an already-classified request.
//! Never performs a lookup; resolving the candidate against the tenant
//! directory is the resolver's job.

use storegate_shared::IdentifierKind;

use super::host::{normalize_host, HostClassification};
use super::RequestView;
use crate::config::RoutingConfig;

/// Query parameters accepted as development-only identifier overrides.
const DEV_OVERRIDE_PARAMS: &[&str] = &["subdomain", "merchant"];

/// Derive the candidate tenant identifier for a classified request.
///
/// Returns `None` when the request carries no tenant identity (admin shell,
/// malformed host) and the caller should pass through.
pub fn extract_identifier(
    classification: HostClassification,
    view: &RequestView<'_>,
    routing: &RoutingConfig,
) -> Option<(String, IdentifierKind)> {
    match classification {
        HostClassification::LocalDevelopment => {
            // Query overrides are a development convenience only. The bare
            // primary domain also classifies here in default-tenant mode,
            // so production must not honor them.
            let identifier = if routing.is_development {
                dev_override(view.query)
            } else {
                None
            }
            .unwrap_or_else(|| routing.default_tenant.clone());
            Some((identifier, IdentifierKind::Subdomain))
        }
        HostClassification::AdminDomain => explicit_merchant_id(view.path)
            .map(|id| (id, IdentifierKind::ExplicitMerchantId)),
        HostClassification::TenantSubdomain => {
            let host = normalize_host(view.host);
            let label = host.split('.').next()?;
            Some((label.to_string(), IdentifierKind::Subdomain))
        }
        HostClassification::CustomDomain => {
            Some((normalize_host(view.host), IdentifierKind::CustomDomain))
        }
        HostClassification::Malformed => None,
    }
}

/// First matching `?subdomain=` / `?merchant=` override, if any.
fn dev_override(query: Option<&str>) -> Option<String> {
    let query = query?;
    for param in DEV_OVERRIDE_PARAMS {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == *param && !value.is_empty() {
                return Some(value.into_owned());
            }
        }
    }
    None
}

/// Merchant id from an admin `/store/{id}` path, if present.
fn explicit_merchant_id(path: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    if segments.next() != Some("store") {
        return None;
    }
    segments.next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RootDomainMode;

    fn routing() -> RoutingConfig {
        RoutingConfig {
            primary_domain: "yourplatform.com".to_string(),
            admin_prefix: "admin.".to_string(),
            root_domain_mode: RootDomainMode::AdminShell,
            default_tenant: "default".to_string(),
            is_development: true,
        }
    }

    fn view<'a>(host: &'a str, path: &'a str, query: Option<&'a str>) -> RequestView<'a> {
        RequestView { host, path, query }
    }

    #[test]
    fn test_subdomain_identifier_is_leftmost_label() {
        let extracted = extract_identifier(
            HostClassification::TenantSubdomain,
            &view("joes-coffee.yourplatform.com", "/products", None),
            &routing(),
        );
        assert_eq!(
            extracted,
            Some(("joes-coffee".to_string(), IdentifierKind::Subdomain))
        );
    }

    #[test]
    fn test_subdomain_identifier_normalizes_host() {
        let extracted = extract_identifier(
            HostClassification::TenantSubdomain,
            &view("ACME.yourplatform.com:8443", "/", None),
            &routing(),
        );
        assert_eq!(
            extracted,
            Some(("acme".to_string(), IdentifierKind::Subdomain))
        );
    }

    #[test]
    fn test_custom_domain_identifier_is_full_host() {
        let extracted = extract_identifier(
            HostClassification::CustomDomain,
            &view("MyStore.com:443", "/", None),
            &routing(),
        );
        assert_eq!(
            extracted,
            Some(("mystore.com".to_string(), IdentifierKind::CustomDomain))
        );
    }

    #[test]
    fn test_dev_override_subdomain_param() {
        let extracted = extract_identifier(
            HostClassification::LocalDevelopment,
            &view("localhost:3000", "/dashboard", Some("subdomain=tenant1")),
            &routing(),
        );
        assert_eq!(
            extracted,
            Some(("tenant1".to_string(), IdentifierKind::Subdomain))
        );
    }

    #[test]
    fn test_dev_override_merchant_param() {
        let extracted = extract_identifier(
            HostClassification::LocalDevelopment,
            &view("127.0.0.1", "/", Some("other=x&merchant=abc123")),
            &routing(),
        );
        assert_eq!(
            extracted,
            Some(("abc123".to_string(), IdentifierKind::Subdomain))
        );
    }

    #[test]
    fn test_dev_default_identifier() {
        let extracted = extract_identifier(
            HostClassification::LocalDevelopment,
            &view("127.0.0.1", "/", None),
            &routing(),
        );
        assert_eq!(
            extracted,
            Some(("default".to_string(), IdentifierKind::Subdomain))
        );
    }

    #[test]
    fn test_subdomain_param_beats_merchant_param() {
        let extracted = extract_identifier(
            HostClassification::LocalDevelopment,
            &view("localhost", "/", Some("merchant=b&subdomain=a")),
            &routing(),
        );
        assert_eq!(extracted, Some(("a".to_string(), IdentifierKind::Subdomain)));
    }

    #[test]
    fn test_production_ignores_query_overrides() {
        let mut production = routing();
        production.is_development = false;
        let extracted = extract_identifier(
            HostClassification::LocalDevelopment,
            &view("yourplatform.com", "/dashboard", Some("subdomain=evil")),
            &production,
        );
        assert_eq!(
            extracted,
            Some(("default".to_string(), IdentifierKind::Subdomain))
        );
    }

    #[test]
    fn test_admin_store_path_yields_merchant_id() {
        let extracted = extract_identifier(
            HostClassification::AdminDomain,
            &view(
                "admin.yourplatform.com",
                "/store/abc123/dashboard/orders",
                None,
            ),
            &routing(),
        );
        assert_eq!(
            extracted,
            Some(("abc123".to_string(), IdentifierKind::ExplicitMerchantId))
        );
    }

    #[test]
    fn test_admin_shell_path_yields_none() {
        let extracted = extract_identifier(
            HostClassification::AdminDomain,
            &view("admin.yourplatform.com", "/settings", None),
            &routing(),
        );
        assert_eq!(extracted, None);
    }

    #[test]
    fn test_malformed_yields_none() {
        let extracted = extract_identifier(
            HostClassification::Malformed,
            &view("", "/", None),
            &routing(),
        );
        assert_eq!(extracted, None);
    }
}
