//! Host header classification
//!
//! Classifies the incoming `Host` header into the routing categories the
//! rest of the pipeline keys on. Supports:
//! - Tenant subdomains: joes-coffee.yourplatform.com
//! - Custom domains: mystore.com (mapped via the tenant directory)
//! - The admin host: admin.yourplatform.com
//! - Local development: localhost / IPv4 literals
//!
//! Classification is a pure function of the host string and the immutable
//! routing configuration; it performs no I/O. The precedence order below is
//! load-bearing: every downstream decision assumes ties resolve in exactly
//! this order.

use crate::config::{RootDomainMode, RoutingConfig};

/// Routing category of an incoming `Host` header. Derived once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostClassification {
    /// localhost or an IPv4 literal; identifier comes from query overrides
    LocalDevelopment,
    /// The administrative host (or the bare primary domain in admin mode)
    AdminDomain,
    /// A tenant subdomain under the primary domain
    TenantSubdomain,
    /// A hostname not under the primary domain, owned by a tenant
    CustomDomain,
    /// Empty or syntactically invalid host; the request is unroutable
    Malformed,
}

/// Pure host classifier over an immutable routing configuration.
#[derive(Debug, Clone)]
pub struct HostClassifier {
    primary_domain: String,
    admin_prefix: String,
    root_domain_mode: RootDomainMode,
}

impl HostClassifier {
    pub fn new(routing: &RoutingConfig) -> Self {
        Self {
            primary_domain: routing.primary_domain.clone(),
            admin_prefix: routing.admin_prefix.clone(),
            root_domain_mode: routing.root_domain_mode,
        }
    }

    /// Classify a raw `Host` header value.
    ///
    /// Precedence (strict, first match wins):
    /// 1. empty / invalid syntax -> `Malformed`
    /// 2. localhost or IPv4 literal -> `LocalDevelopment`
    /// 3. admin prefix -> `AdminDomain`
    /// 4. `*.{primary}` with >2 labels, leftmost != www -> `TenantSubdomain`
    /// 5. not under the primary domain, >=2 labels -> `CustomDomain`
    /// 6. bare primary domain / www / single label -> the configured
    ///    root-domain fallback
    pub fn classify(&self, host_header: &str) -> HostClassification {
        let host = normalize_host(host_header);

        if host.is_empty() || !is_valid_host_syntax(&host) {
            return HostClassification::Malformed;
        }

        if host == "localhost"
            || host.ends_with(".localhost")
            || is_ipv4_literal(&host)
            || is_ipv6_loopback(&host)
        {
            return HostClassification::LocalDevelopment;
        }

        if host.starts_with(&self.admin_prefix) {
            return HostClassification::AdminDomain;
        }

        let under_primary = host == self.primary_domain
            || host.ends_with(&format!(".{}", self.primary_domain));

        if under_primary && host != self.primary_domain {
            let leftmost = host.split('.').next().unwrap_or("");
            if host.split('.').count() > 2 && leftmost != "www" {
                return HostClassification::TenantSubdomain;
            }
        }

        if !under_primary && host.split('.').count() >= 2 {
            return HostClassification::CustomDomain;
        }

        // Bare primary domain, www.{primary}, or a dotless hostname. This
        // usually means a misconfigured deployment, so it is logged for
        // operator visibility.
        tracing::warn!(
            host = %host,
            mode = ?self.root_domain_mode,
            "Host matched no classification rule, using root-domain fallback"
        );
        match self.root_domain_mode {
            RootDomainMode::AdminShell => HostClassification::AdminDomain,
            RootDomainMode::DefaultTenant => HostClassification::LocalDevelopment,
        }
    }
}

/// Normalize a host header value: strip the port, lowercase.
pub(crate) fn normalize_host(host: &str) -> String {
    // Bracketed IPv6 literals carry their own colons
    if let Some(rest) = host.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return format!("[{}]", &rest[..end].to_lowercase());
        }
        return host.to_lowercase();
    }
    let host = host.split(':').next().unwrap_or(host);
    host.trim().to_lowercase()
}

/// Basic hostname syntax validation: dot-separated labels of alphanumerics,
/// hyphens and underscores, no empty labels, no leading/trailing hyphen.
fn is_valid_host_syntax(host: &str) -> bool {
    if host.len() > 253 {
        return false;
    }
    if is_ipv6_loopback(host) {
        return true;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// IPv4 literal: exactly four dot-separated decimal octets in 0..=255.
fn is_ipv4_literal(host: &str) -> bool {
    let octets: Vec<&str> = host.split('.').collect();
    if octets.len() != 4 {
        return false;
    }
    octets.iter().all(|octet| {
        !octet.is_empty()
            && octet.len() <= 3
            && octet.chars().all(|c| c.is_ascii_digit())
            && octet.parse::<u16>().map(|n| n <= 255).unwrap_or(false)
    })
}

fn is_ipv6_loopback(host: &str) -> bool {
    host == "[::1]"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RootDomainMode;

    fn classifier(mode: RootDomainMode) -> HostClassifier {
        HostClassifier::new(&RoutingConfig {
            primary_domain: "yourplatform.com".to_string(),
            admin_prefix: "admin.".to_string(),
            root_domain_mode: mode,
            default_tenant: "default".to_string(),
            is_development: false,
        })
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Example.COM"), "example.com");
        assert_eq!(normalize_host("example.com:8080"), "example.com");
        assert_eq!(normalize_host("EXAMPLE.COM:443"), "example.com");
        assert_eq!(normalize_host("[::1]:3000"), "[::1]");
    }

    #[test]
    fn test_malformed_hosts() {
        let c = classifier(RootDomainMode::AdminShell);
        assert_eq!(c.classify(""), HostClassification::Malformed);
        assert_eq!(c.classify("   "), HostClassification::Malformed);
        assert_eq!(c.classify("bad..host"), HostClassification::Malformed);
        assert_eq!(c.classify(".leading.dot"), HostClassification::Malformed);
        assert_eq!(c.classify("trailing.dot."), HostClassification::Malformed);
        assert_eq!(c.classify("-bad.example.com"), HostClassification::Malformed);
        assert_eq!(c.classify("sp ace.com"), HostClassification::Malformed);
    }

    #[test]
    fn test_local_development() {
        let c = classifier(RootDomainMode::AdminShell);
        assert_eq!(c.classify("localhost"), HostClassification::LocalDevelopment);
        assert_eq!(
            c.classify("localhost:3000"),
            HostClassification::LocalDevelopment
        );
        assert_eq!(
            c.classify("tenant1.localhost:3000"),
            HostClassification::LocalDevelopment
        );
        assert_eq!(c.classify("127.0.0.1"), HostClassification::LocalDevelopment);
        assert_eq!(
            c.classify("192.168.1.10:8080"),
            HostClassification::LocalDevelopment
        );
        assert_eq!(c.classify("[::1]:3000"), HostClassification::LocalDevelopment);
    }

    #[test]
    fn test_ipv4_literal_bounds() {
        assert!(is_ipv4_literal("255.255.255.255"));
        assert!(is_ipv4_literal("0.0.0.0"));
        assert!(!is_ipv4_literal("256.1.1.1"));
        assert!(!is_ipv4_literal("1.2.3"));
        assert!(!is_ipv4_literal("1.2.3.4.5"));
        // Dotted-decimal-looking domains are not IPv4 literals
        assert!(!is_ipv4_literal("1.2.3.com"));
    }

    #[test]
    fn test_admin_domain_takes_precedence() {
        let c = classifier(RootDomainMode::AdminShell);
        assert_eq!(
            c.classify("admin.yourplatform.com"),
            HostClassification::AdminDomain
        );
        // Admin prefix beats the subdomain rule
        assert_eq!(
            c.classify("admin.yourplatform.com:443"),
            HostClassification::AdminDomain
        );
        // Even on a foreign domain, the prefix wins (rule 3 before rule 5)
        assert_eq!(
            c.classify("admin.mystore.com"),
            HostClassification::AdminDomain
        );
    }

    #[test]
    fn test_tenant_subdomains() {
        let c = classifier(RootDomainMode::AdminShell);
        assert_eq!(
            c.classify("joes-coffee.yourplatform.com"),
            HostClassification::TenantSubdomain
        );
        assert_eq!(
            c.classify("ACME.yourplatform.com:8443"),
            HostClassification::TenantSubdomain
        );
        // www is not a tenant
        assert_ne!(
            c.classify("www.yourplatform.com"),
            HostClassification::TenantSubdomain
        );
    }

    #[test]
    fn test_custom_domains() {
        let c = classifier(RootDomainMode::AdminShell);
        assert_eq!(c.classify("mystore.com"), HostClassification::CustomDomain);
        assert_eq!(
            c.classify("shop.mystore.com"),
            HostClassification::CustomDomain
        );
        // String-suffix overlap with the primary domain is not "under" it
        assert_eq!(
            c.classify("notyourplatform.com"),
            HostClassification::CustomDomain
        );
    }

    #[test]
    fn test_root_domain_fallback_admin_shell() {
        let c = classifier(RootDomainMode::AdminShell);
        assert_eq!(
            c.classify("yourplatform.com"),
            HostClassification::AdminDomain
        );
        assert_eq!(
            c.classify("www.yourplatform.com"),
            HostClassification::AdminDomain
        );
        // Dotless intranet-style host also falls through
        assert_eq!(c.classify("intranet"), HostClassification::AdminDomain);
    }

    #[test]
    fn test_root_domain_fallback_default_tenant() {
        let c = classifier(RootDomainMode::DefaultTenant);
        assert_eq!(
            c.classify("yourplatform.com"),
            HostClassification::LocalDevelopment
        );
        assert_eq!(
            c.classify("www.yourplatform.com"),
            HostClassification::LocalDevelopment
        );
    }
}
